//! Line-oriented prompts: questions on stderr, answers from stdin.

use std::io::Write;

use anyhow::bail;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct Prompt<R> {
    lines: Lines<R>,
}

impl Prompt<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Print `question` and return the next trimmed line of input.
    pub async fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        eprint!("{question}: ");
        std::io::stderr().flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => bail!("input closed while waiting for {question}"),
        }
    }
}
