//! In-process stand-ins for the code transport and the account backend.
//!
//! Codes are "delivered" by printing them to stderr, leaving stdout to the
//! command's own output.

use std::collections::HashMap;
use std::io::Write;

use async_trait::async_trait;
use onboard_types::{
    ChannelKind, CodeService, DeliveryError, InvalidCodeError, OtpCode, SubmissionError,
    SubmissionReceipt, SubmissionService,
};
use rand::Rng;
use tokio::sync::Mutex;

fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

type Sink = Box<dyn Write + Send>;

/// Issues a random code per `(kind, target)` and prints it.
pub struct ConsoleCodeService {
    code_length: usize,
    issued: Mutex<HashMap<(ChannelKind, String), String>>,
    out: std::sync::Mutex<Sink>,
}

impl ConsoleCodeService {
    pub fn new(code_length: usize) -> Self {
        Self::with_writer(code_length, Box::new(std::io::stderr()))
    }

    pub fn with_writer(code_length: usize, out: Sink) -> Self {
        Self {
            code_length,
            issued: Mutex::new(HashMap::new()),
            out: std::sync::Mutex::new(out),
        }
    }

    fn announce(&self, kind: ChannelKind, target: &str, code: &str) -> Result<(), DeliveryError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| DeliveryError::new(kind, "console unavailable"))?;
        writeln!(out, "[{kind} to {target}] your verification code is {code}")
            .and_then(|()| out.flush())
            .map_err(|e| DeliveryError::new(kind, e.to_string()))
    }
}

#[async_trait]
impl CodeService for ConsoleCodeService {
    async fn send_code(&self, kind: ChannelKind, target: &str) -> Result<(), DeliveryError> {
        if target.is_empty() {
            return Err(DeliveryError::new(kind, "no target"));
        }
        let code = random_digits(self.code_length);
        self.announce(kind, target, &code)?;
        self.issued
            .lock()
            .await
            .insert((kind, target.to_string()), code);
        Ok(())
    }

    async fn check_code(
        &self,
        kind: ChannelKind,
        target: &str,
        code: &OtpCode,
    ) -> Result<(), InvalidCodeError> {
        let issued = self.issued.lock().await;
        match issued.get(&(kind, target.to_string())) {
            Some(expected) if expected == code.as_str() => Ok(()),
            _ => Err(InvalidCodeError { kind }),
        }
    }
}

/// Accepts every submission and hands out a random reference.
pub struct ConsoleSubmission {
    prefix: &'static str,
    next: Option<&'static str>,
}

impl ConsoleSubmission {
    /// Account creation; the next stop is society onboarding.
    pub fn accounts() -> Self {
        Self {
            prefix: "acct",
            next: Some("/onboarding"),
        }
    }

    pub fn societies() -> Self {
        Self {
            prefix: "soc",
            next: Some("/"),
        }
    }
}

#[async_trait]
impl<P: Sync> SubmissionService<P> for ConsoleSubmission {
    async fn complete(&self, _payload: &P) -> Result<SubmissionReceipt, SubmissionError> {
        Ok(SubmissionReceipt {
            reference: format!("{}-{}", self.prefix, random_digits(8)),
            next: self.next.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn random_digits_have_requested_length() {
        let code = random_digits(6);
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn code_is_written_to_the_console_sink() {
        let captured = Captured::default();
        let svc = ConsoleCodeService::with_writer(6, Box::new(captured.clone()));
        svc.send_code(ChannelKind::Phone, "9876543210").await.unwrap();

        let issued = svc
            .issued
            .lock()
            .await
            .get(&(ChannelKind::Phone, "9876543210".to_string()))
            .cloned()
            .unwrap();
        let printed = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            printed,
            format!("[phone to 9876543210] your verification code is {issued}\n")
        );
    }

    #[tokio::test]
    async fn only_the_issued_code_checks_out() {
        let svc = ConsoleCodeService::new(6);
        svc.send_code(ChannelKind::Email, "a@b.co").await.unwrap();
        let issued = svc
            .issued
            .lock()
            .await
            .get(&(ChannelKind::Email, "a@b.co".to_string()))
            .cloned()
            .unwrap();

        let good = OtpCode::parse(&issued, 6).unwrap();
        assert!(svc.check_code(ChannelKind::Email, "a@b.co", &good).await.is_ok());
        // Same code for another target or channel is rejected.
        assert!(svc.check_code(ChannelKind::Email, "x@b.co", &good).await.is_err());
        assert!(svc.check_code(ChannelKind::Phone, "a@b.co", &good).await.is_err());
    }

    #[tokio::test]
    async fn resend_replaces_the_previous_code() {
        let svc = ConsoleCodeService::new(6);
        svc.send_code(ChannelKind::Phone, "9876543210").await.unwrap();
        let key = (ChannelKind::Phone, "9876543210".to_string());
        let first = svc.issued.lock().await.get(&key).cloned().unwrap();
        loop {
            svc.send_code(ChannelKind::Phone, "9876543210").await.unwrap();
            let second = svc.issued.lock().await.get(&key).cloned().unwrap();
            if second != first {
                let old = OtpCode::parse(&first, 6).unwrap();
                assert!(svc
                    .check_code(ChannelKind::Phone, "9876543210", &old)
                    .await
                    .is_err());
                break;
            }
        }
    }

    #[tokio::test]
    async fn submission_reference_uses_prefix() {
        let receipt = SubmissionService::<()>::complete(&ConsoleSubmission::accounts(), &())
            .await
            .unwrap();
        assert!(receipt.reference.starts_with("acct-"));
        assert_eq!(receipt.next.as_deref(), Some("/onboarding"));
    }
}
