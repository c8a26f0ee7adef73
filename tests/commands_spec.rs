mod common;

use common::{RecordingConfirmer, RecordingExecutor};
use lagoon_sync::commands::export::{self, ExportOptions};
use lagoon_sync::commands::import::{self, ImportOptions, ImportOutcome, CONFIRM_IMPORT, EXAMPLE};
use lagoon_sync::commands::{parse, render_plan};
use lagoon_sync::CliError;
use lagoon_sync_core::{parse_str, ImportError, SkipExport};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const SCENARIO: &str = r#"
groups:
  - name: example-com
users:
  - user:
      email: usera@example.com
    groups:
      - name: example-com
        role: owner
projects:
  - project:
      name: example-com
      giturl: git@github.com:example/example-com.git
    groups:
      - example-com
"#;

fn interactive() -> ImportOptions {
    ImportOptions {
        interactive: true,
        ..Default::default()
    }
}

mod import_command {
    use super::*;

    #[tokio::test]
    async fn malformed_documents_fail_before_any_remote_call() {
        let executor = RecordingExecutor::new();
        let confirmer = RecordingConfirmer::answering(true);

        let err = import::run(
            b"groups: [unclosed",
            &interactive(),
            &executor,
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CliError::Import(ImportError::MalformedDocument(_))));
        assert!(executor.calls().is_empty());
        assert!(confirmer.asked().is_empty());
    }

    #[tokio::test]
    async fn dry_run_only_plans() {
        let executor = RecordingExecutor::new();
        let confirmer = RecordingConfirmer::answering(true);
        let options = ImportOptions {
            dry_run: true,
            ..interactive()
        };

        let outcome = import::run(
            SCENARIO.as_bytes(),
            &options,
            &executor,
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let ImportOutcome::Planned(plan) = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(
            render_plan(&plan),
            "create-group(example-com)\n\
             create-user(usera@example.com)\n\
             add-user-to-group(usera@example.com, example-com)\n\
             create-project(example-com)\n\
             link-project-group(example-com, example-com)\n"
        );
        assert!(executor.calls().is_empty());
        assert!(confirmer.asked().is_empty());
    }

    #[tokio::test]
    async fn dry_run_never_resolves_the_endpoint() {
        let confirmer = RecordingConfirmer::answering(true);
        let options = ImportOptions {
            dry_run: true,
            ..Default::default()
        };

        let outcome = import::run_with(
            SCENARIO.as_bytes(),
            &options,
            || -> lagoon_sync::Result<RecordingExecutor> {
                Err(CliError::Config("lagoon 'nowhere' is not defined".into()))
            },
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ImportOutcome::Planned(ref plan) if plan.len() == 5));
    }

    #[tokio::test]
    async fn endpoint_errors_stop_a_real_run_before_the_prompt() {
        let confirmer = RecordingConfirmer::answering(true);

        let err = import::run_with(
            SCENARIO.as_bytes(),
            &interactive(),
            || -> lagoon_sync::Result<RecordingExecutor> {
                Err(CliError::Config("lagoon 'nowhere' is not defined".into()))
            },
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
        assert!(confirmer.asked().is_empty());
    }

    #[tokio::test]
    async fn declining_the_prompt_applies_nothing() {
        let executor = RecordingExecutor::new();
        let confirmer = RecordingConfirmer::answering(false);

        let outcome = import::run(
            SCENARIO.as_bytes(),
            &interactive(),
            &executor,
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ImportOutcome::Declined));
        assert_eq!(confirmer.asked(), vec![CONFIRM_IMPORT.to_string()]);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_interactive_runs_stop_at_the_first_failure() {
        let executor = RecordingExecutor::new().failing("addGroup", "name", "example-com", "taken");
        let confirmer = RecordingConfirmer::answering(true);

        let outcome = import::run(
            SCENARIO.as_bytes(),
            &interactive(),
            &executor,
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let ImportOutcome::Applied(result) = outcome else {
            panic!("expected an applied run");
        };
        assert_eq!(executor.calls().len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.not_attempted, 4);
    }

    #[tokio::test]
    async fn piped_runs_do_not_prompt_and_keep_going() {
        let executor = RecordingExecutor::new().failing("addGroup", "name", "example-com", "taken");
        let confirmer = RecordingConfirmer::answering(false);

        let outcome = import::run(
            SCENARIO.as_bytes(),
            &ImportOptions::default(),
            &executor,
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let ImportOutcome::Applied(result) = outcome else {
            panic!("expected an applied run");
        };
        assert!(confirmer.asked().is_empty());
        assert_eq!(executor.calls().len(), 5);
        assert_eq!(result.applied, 4);
    }

    #[tokio::test]
    async fn forced_interactive_runs_skip_the_prompt() {
        let executor = RecordingExecutor::new();
        let confirmer = RecordingConfirmer::answering(false);
        let options = ImportOptions {
            force: true,
            default_openshift: Some(4),
            ..interactive()
        };

        let outcome = import::run(
            SCENARIO.as_bytes(),
            &options,
            &executor,
            &confirmer,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ImportOutcome::Applied(ref r) if r.is_success()));
        assert!(confirmer.asked().is_empty());
        let calls = executor.calls();
        assert_eq!(calls[3].0, "addProject");
        assert_eq!(calls[3].1["openshift"], 4);
    }
}

mod export_command {
    use super::*;

    #[tokio::test]
    async fn declining_makes_no_request() {
        let executor = RecordingExecutor::new();
        let confirmer = RecordingConfirmer::answering(false);
        let options = ExportOptions {
            interactive: true,
            ..Default::default()
        };

        let output = export::run(&options, &executor, &confirmer).await.unwrap();

        assert!(output.is_none());
        assert!(executor.calls().is_empty());
        assert_eq!(
            confirmer.asked(),
            vec!["Are you sure you want to export lagoon output for all projects?".to_string()]
        );
    }

    #[tokio::test]
    async fn targets_a_single_project_by_name() {
        let snapshot = common::all_projects_snapshot();
        let project = snapshot["data"]["allProjects"][1].clone();
        let executor = RecordingExecutor::new()
            .responding("projectByName", json!({ "projectByName": project }));
        let confirmer = RecordingConfirmer::answering(true);
        let options = ExportOptions {
            project: Some("example-com-api".into()),
            interactive: true,
            ..Default::default()
        };

        let yaml = export::run(&options, &executor, &confirmer)
            .await
            .unwrap()
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls[0].0, "projectByName");
        assert_eq!(calls[0].1["name"], "example-com-api");
        assert_eq!(
            confirmer.asked(),
            vec!["Are you sure you want to export lagoon output for example-com-api?".to_string()]
        );

        let body = yaml.split_once('\n').unwrap().1;
        let document = parse_str(body).unwrap();
        assert_eq!(document.projects.len(), 1);
        assert_eq!(document.projects[0].name, "example-com-api");
    }

    #[tokio::test]
    async fn missing_project_is_an_error() {
        let executor =
            RecordingExecutor::new().responding("projectByName", json!({ "projectByName": null }));
        let options = ExportOptions {
            project: Some("ghost".into()),
            force: true,
            ..Default::default()
        };

        let err = export::run(&options, &executor, &RecordingConfirmer::answering(true))
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::ProjectNotFound(ref name) if name == "ghost"));
    }

    #[tokio::test]
    async fn remote_failures_surface_as_errors() {
        let executor = RecordingExecutor::new().rejecting("allProjects", "Unauthorized");
        let confirmer = RecordingConfirmer::answering(true);
        let err = export::run(&ExportOptions::default(), &executor, &confirmer)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Remote(ref message) if message == "Unauthorized"));
    }

    #[tokio::test]
    async fn unexpected_responses_are_malformed_snapshots() {
        let executor =
            RecordingExecutor::new().responding("allProjects", json!({ "unexpected": true }));
        let confirmer = RecordingConfirmer::answering(true);
        let err = export::run(&ExportOptions::default(), &executor, &confirmer)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Import(ImportError::MalformedSnapshot(_))));
    }

    #[tokio::test]
    async fn skip_filters_reach_the_document() {
        let executor =
            RecordingExecutor::new().responding("allProjects", common::all_projects_snapshot());
        let options = ExportOptions {
            skip: SkipExport {
                slack: true,
                users: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let yaml = export::run(&options, &executor, &RecordingConfirmer::answering(true))
            .await
            .unwrap()
            .unwrap();

        assert!(!yaml.contains("example-com-slack"));
        assert!(!yaml.contains("usera@example.com"));
        assert!(yaml.contains("example-com-rocketchat"));
    }
}

mod parse_command {
    use super::*;

    #[test]
    fn converts_query_output_into_an_importable_document() {
        let raw = serde_json::to_vec(&common::all_projects_snapshot()).unwrap();
        let yaml = parse::run(&raw).unwrap();

        let document = parse_str(&yaml).unwrap();
        assert_eq!(document.projects.len(), 2);
        assert!(yaml.contains("example-com-slack"));
    }

    #[test]
    fn rejects_input_that_is_not_a_snapshot() {
        let err = parse::run(EXAMPLE.as_bytes()).unwrap_err();
        assert!(matches!(err, CliError::Import(ImportError::MalformedSnapshot(_))));
    }
}
