//! The subcommands, written against the service traits so tests can run them
//! with the nullable services and scripted input.

use std::sync::Arc;

use anyhow::anyhow;
use onboard_forms::{schemas, FieldError, FormPayload, FormState, LocationCascade};
use onboard_search::{AsyncSearchSelector, SearchPolicy};
use onboard_types::{
    ChannelKind, Clock, CodeService, LoginIdentity, OnboardingPayload, SearchService,
    SelectOption, SignupPayload, SubmissionReceipt, SubmissionService, SystemClock,
};
use onboard_utils::format_duration;
use onboard_verification::{
    ChannelController, ChannelStatus, LoginChallengeFlow, VerificationError,
    VerificationOrchestrator, VerificationPolicy,
};
use tokio::io::AsyncBufRead;

use crate::console::{ConsoleCodeService, ConsoleSubmission};
use crate::directory;
use crate::prompt::Prompt;

const RESEND: &str = "resend";

/// The external services the commands talk to.
pub struct Backend {
    pub codes: Arc<dyn CodeService>,
    pub clock: Arc<dyn Clock>,
    pub accounts: Arc<dyn SubmissionService<SignupPayload>>,
    pub societies: Arc<dyn SubmissionService<OnboardingPayload>>,
}

impl Backend {
    pub fn console(policy: &VerificationPolicy) -> Self {
        Self {
            codes: Arc::new(ConsoleCodeService::new(policy.code_length)),
            clock: Arc::new(SystemClock),
            accounts: Arc::new(ConsoleSubmission::accounts()),
            societies: Arc::new(ConsoleSubmission::societies()),
        }
    }
}

fn report(err: &VerificationError) {
    match err {
        VerificationError::Cooldown { remaining_secs } => eprintln!(
            "wait {} before asking for a new code",
            format_duration(*remaining_secs)
        ),
        other => eprintln!("{other}"),
    }
}

fn field_errors(errors: Vec<FieldError>) -> anyhow::Error {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    anyhow!("invalid input: {joined}")
}

/// Verify both channels, then create the account.
pub async fn signup<R: AsyncBufRead + Unpin>(
    backend: &Backend,
    policy: &VerificationPolicy,
    payload: SignupPayload,
    prompt: &mut Prompt<R>,
) -> anyhow::Result<SubmissionReceipt> {
    schemas::signup()
        .validate_payload(&payload)
        .map_err(field_errors)?;

    let orchestrator = VerificationOrchestrator::signup(
        backend.codes.clone(),
        backend.clock.clone(),
        backend.accounts.clone(),
        policy.clone(),
    )?;
    let phone = orchestrator
        .channel(ChannelKind::Phone)
        .ok_or(VerificationError::UnknownChannel(ChannelKind::Phone))?;
    let email = orchestrator
        .channel(ChannelKind::Email)
        .ok_or(VerificationError::UnknownChannel(ChannelKind::Email))?;

    phone.set_target(&payload.phone).await?;
    email.set_target(&payload.email).await?;
    let (sent_phone, sent_email) = tokio::join!(phone.request_code(), email.request_code());
    sent_phone?;
    sent_email?;

    verify_channel(phone, prompt).await?;
    verify_channel(email, prompt).await?;

    Ok(orchestrator.submit(&payload).await?)
}

async fn verify_channel<R: AsyncBufRead + Unpin>(
    controller: &ChannelController,
    prompt: &mut Prompt<R>,
) -> anyhow::Result<()> {
    let kind = controller.kind();
    loop {
        let input = prompt
            .ask(&format!("{kind} code (or \"{RESEND}\")"))
            .await?;

        let result = if input.eq_ignore_ascii_case(RESEND) {
            match controller.status().await? {
                // A rejected code is retried with a fresh send.
                ChannelStatus::Failed => controller.request_code().await,
                _ => controller.resend().await,
            }
        } else {
            controller.submit_code(&input).await
        };

        match result {
            Ok(()) if controller.status().await? == ChannelStatus::Verified => {
                eprintln!("{kind} verified");
                return Ok(());
            }
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                report(&e);
                if controller.status().await? == ChannelStatus::Failed {
                    eprintln!("type \"{RESEND}\" to get a new code");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Identify with phone and society, then answer the code challenge.
pub async fn login<R: AsyncBufRead + Unpin>(
    backend: &Backend,
    policy: &VerificationPolicy,
    identity: LoginIdentity,
    prompt: &mut Prompt<R>,
) -> anyhow::Result<LoginIdentity> {
    let flow = LoginChallengeFlow::new(backend.codes.clone(), backend.clock.clone(), policy.clone());
    flow.identify(identity).await.map_err(|e| match e {
        VerificationError::Validation(errors) => field_errors(errors),
        other => other.into(),
    })?;

    loop {
        let input = prompt.ask(&format!("login code (or \"{RESEND}\")")).await?;
        let result = if input.eq_ignore_ascii_case(RESEND) {
            flow.resend().await.map(|()| None)
        } else {
            flow.challenge(&input).await.map(Some)
        };
        match result {
            Ok(Some(identity)) => return Ok(identity),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => report(&e),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Run one query through the debounced selector and return what it accepted.
pub async fn search_societies(
    catalog: Arc<dyn SearchService>,
    policy: &SearchPolicy,
    query: &str,
) -> Vec<SelectOption> {
    let selector = AsyncSearchSelector::new(catalog, policy);
    selector.open();
    selector.set_query(query).await;
    let state = selector.settled().await;
    selector.close();
    state.options().to_vec()
}

/// Validate the onboarding form and register the society.
pub async fn register(
    backend: &Backend,
    payload: OnboardingPayload,
) -> anyhow::Result<SubmissionReceipt> {
    let mut form = FormState::with_values(payload.to_values());
    form.submit(&schemas::onboarding()).map_err(field_errors)?;

    let mut cascade = LocationCascade::new(directory::locations());
    cascade.select_country(&payload.country)?;
    cascade.select_state(&payload.state)?;
    cascade.select_city(&payload.city)?;

    Ok(backend.societies.complete(&payload).await?)
}
