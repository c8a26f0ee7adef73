use lagoon_sync_core::{
    plan_with_options, ApplyResult, FailurePolicy, Operation, PlanOptions, Reconciler,
    RequestExecutor,
};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::prompt::Confirmer;

pub const CONFIRM_IMPORT: &str =
    "Are you sure you want to import this data, it is potentially dangerous";

/// Printed by `import --example`.
pub const EXAMPLE: &str = r#"groups:
  - name: example-com
users:
  - user:
      email: usera@example.com
      sshkey: ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIG/1WiXC+XSpGQsTBYhWMy8WCIIGGtq26GKHeXy9vySf usera@macbook.local
    groups:
      - name: example-com
        role: owner
  - user:
      email: userb@example.com
      sshkey: ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIJ3qUs3GlmILI4ozHhCXPVq1WEv3gb0Mtc5FGu4l+qCl userb@macbook.local
    groups:
      - name: example-com
        role: developer
slack:
  - name: example-com-slack
    webhook: https://slack.com/webhook
    channel: example-com
rocketchat:
  - name: example-com-rocketchat
    webhook: https://rocketchat.com/webhook
    channel: example-com
  - name: example-com-api-rocketchat
    webhook: https://rocketchat.com/webhook
    channel: example-com-api
projects:
  - project:
      name: example-com
      giturl: "git@github.com:example/example-com.git"
      openshift: 1
      branches: master|develop|staging
      productionenvironment: master
    notifications:
      slack:
        - example-com-slack
      rocketchat:
        - example-com-rocketchat
    groups:
      - example-com
  - project:
      name: example-com-api
      giturl: "git@github.com:example/example-com-api.git"
      openshift: 1
      branches: master|develop|staging
      productionenvironment: master
    notifications:
      rocketchat:
        - example-com-api-rocketchat
    groups:
      - example-com
"#;

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Skip the confirmation and keep going past failures.
    pub force: bool,
    /// Print the plan without contacting the platform.
    pub dry_run: bool,
    /// Stdin is a terminal, so the operator can be asked.
    pub interactive: bool,
    pub default_openshift: Option<u64>,
}

impl ImportOptions {
    /// A supervised run stops at the first failure; an unattended or forced
    /// one collects every failure.
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.interactive && !self.force {
            FailurePolicy::AbortOnFirstError
        } else {
            FailurePolicy::ContinueCollectingErrors
        }
    }

    fn needs_confirmation(&self) -> bool {
        self.interactive && !self.force
    }
}

#[derive(Debug)]
pub enum ImportOutcome {
    /// Dry run: the plan that would have been applied.
    Planned(Vec<Operation>),
    /// The operator answered "no".
    Declined,
    Applied(ApplyResult),
}

/// Parse, plan and apply a raw document.
///
/// A document that fails to parse is returned as an error before the
/// confirmer or executor is touched.
pub async fn run<E: RequestExecutor>(
    raw: &[u8],
    options: &ImportOptions,
    executor: E,
    confirmer: &dyn Confirmer,
    cancel: CancellationToken,
) -> Result<ImportOutcome> {
    run_with(raw, options, || Ok(executor), confirmer, cancel).await
}

/// Like [`run`], but the executor is only built once the plan is going to be
/// applied. A dry run never calls `connect`, so it works without a usable
/// configuration.
pub async fn run_with<E, F>(
    raw: &[u8],
    options: &ImportOptions,
    connect: F,
    confirmer: &dyn Confirmer,
    cancel: CancellationToken,
) -> Result<ImportOutcome>
where
    E: RequestExecutor,
    F: FnOnce() -> Result<E>,
{
    let document = lagoon_sync_core::parse(raw)?;
    let plan = plan_with_options(
        &document,
        &PlanOptions {
            default_openshift: options.default_openshift,
        },
    );
    tracing::info!(operations = plan.len(), "planned import");

    if options.dry_run {
        return Ok(ImportOutcome::Planned(plan));
    }

    let executor = connect()?;

    if options.needs_confirmation() && !confirmer.confirm(CONFIRM_IMPORT)? {
        return Ok(ImportOutcome::Declined);
    }

    let result = Reconciler::new(executor)
        .with_cancellation(cancel)
        .apply(&plan, options.failure_policy())
        .await;
    Ok(ImportOutcome::Applied(result))
}
