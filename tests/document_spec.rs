use lagoon_sync::commands::import::EXAMPLE;
use lagoon_sync_core::*;
use speculate2::speculate;

const MINIMAL: &str = r#"
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

fn malformed(text: &str) -> String {
    match parse_str(text) {
        Err(ImportError::MalformedDocument(message)) => message,
        other => panic!("expected a malformed document, got {:?}", other),
    }
}

speculate! {
    describe "parse" {
        it "reads every category of the example document" {
            let document = parse_str(EXAMPLE).expect("example should parse");

            assert_eq!(document.groups, vec![Group::new("example-com")]);
            assert_eq!(document.users.len(), 2);
            assert_eq!(document.users[1].groups[0].role, GroupRole::Developer);
            assert_eq!(document.channels(NotificationKind::Slack).count(), 1);
            assert_eq!(document.channels(NotificationKind::RocketChat).count(), 2);

            let project = &document.projects[0];
            assert_eq!(project.git_url, "git@github.com:example/example-com.git");
            assert_eq!(project.openshift, Some(1));
            assert_eq!(project.branches.as_deref(), Some("master|develop|staging"));
            assert_eq!(project.production_environment.as_deref(), Some("master"));
            assert_eq!(
                project.notifications[&NotificationKind::RocketChat],
                vec!["example-com-rocketchat".to_string()]
            );
        }

        it "keeps the ssh key line as written" {
            let document = parse_str(EXAMPLE).unwrap();
            let key = document.users[0].ssh_key.as_deref().unwrap();
            assert!(key.starts_with("ssh-ed25519 AAAA"));
            assert!(key.ends_with("usera@macbook.local"));
        }

        it "treats empty input as an empty document" {
            assert!(parse(b"").unwrap().is_empty());
            assert!(parse_str("# nothing here\n").unwrap().is_empty());
        }

        it "accepts role names in any case" {
            let document = parse_str(&MINIMAL.replace("role: owner", "role: OWNER")).unwrap();
            assert_eq!(document.users[0].groups[0].role, GroupRole::Owner);
        }

        it "accepts references to entities the document does not define" {
            let document = parse_str(r#"
projects:
  - project:
      name: example-com
      giturl: git@github.com:example/example-com.git
    groups: [already-on-the-platform]
    notifications:
      slack: [existing-slack]
"#).unwrap();

            assert_eq!(document.projects[0].groups, vec!["already-on-the-platform".to_string()]);
            assert!(document.groups.is_empty());
        }

        it "drops empty notification lists" {
            let text = format!("{}    notifications:\n      slack: []\n", MINIMAL);
            let with_empty = parse_str(&text).unwrap();
            let without = parse_str(MINIMAL).unwrap();

            assert!(with_empty.projects[0].notifications.is_empty());
            assert_eq!(with_empty, without);
        }

        it "ignores unknown keys" {
            let document = parse_str(&format!("{}\nextras: true\n", MINIMAL)).unwrap();
            assert_eq!(document.projects.len(), 1);
        }

        it "rejects input that is not UTF-8" {
            assert!(matches!(parse(&[0xff, 0xfe, 0x00]), Err(ImportError::MalformedDocument(_))));
        }

        it "rejects invalid YAML" {
            let message = malformed("groups: [unclosed");
            assert!(message.contains("invalid YAML"));
        }

        it "rejects a project without a git url" {
            malformed(r#"
projects:
  - project:
      name: example-com
"#);
        }

        it "rejects a branches value that is not a string" {
            let text = r#"
projects:
  - project:
      name: example-com
      giturl: git@github.com:example/example-com.git
      branches: 5
"#;
            malformed(text);
            let quoted = parse_str(&text.replace("branches: 5", "branches: \"5\"")).unwrap();
            assert_eq!(quoted.projects[0].branches.as_deref(), Some("5"));
        }

        it "rejects empty required names" {
            let message = malformed("groups:\n  - name: \"\"\n");
            assert!(message.contains("group name must not be empty"));
        }

        it "rejects unknown roles" {
            let message = malformed(&MINIMAL.replace("role: owner", "role: admiral"));
            assert!(message.contains("admiral"));
        }

        it "rejects unknown notification kinds under a project" {
            let message = malformed(&format!("{}    notifications:\n      pager: [x]\n", MINIMAL));
            assert!(message.contains("pager"));
        }

        it "rejects duplicate names within a category" {
            let message = malformed("groups:\n  - name: a\n  - name: a\n");
            assert_eq!(message, "duplicate group 'a'");

            let message = malformed(r#"
slack:
  - {name: alerts, webhook: https://a, channel: a}
  - {name: alerts, webhook: https://b, channel: b}
"#);
            assert!(message.contains("duplicate slack 'alerts'"));
        }

        it "allows the same channel name under different kinds" {
            let document = parse_str(r#"
slack:
  - {name: alerts, webhook: https://a, channel: a}
rocketchat:
  - {name: alerts, webhook: https://b, channel: b}
"#).unwrap();
            assert_eq!(document.notifications.len(), 2);
        }
    }

    describe "serialize" {
        it "produces a document that parses back to the same model" {
            let document = parse_str(EXAMPLE).unwrap();
            let yaml = serialize(&document).unwrap();
            assert_eq!(parse_str(&yaml).unwrap(), document);
        }

        it "round-trips a project holding an empty notification list" {
            let mut project = Project::new("example-com", "git@github.com:example/example-com.git");
            project.notifications.insert(NotificationKind::Slack, Vec::new());
            let document = Document {
                projects: vec![project],
                ..Default::default()
            };

            let yaml = serialize(&document).unwrap();
            assert!(!yaml.contains("slack"));
            assert_eq!(parse_str(&yaml).unwrap(), document);
        }

        it "leaves out empty categories and unset fields" {
            let yaml = serialize(&parse_str(MINIMAL).unwrap()).unwrap();

            assert!(!yaml.contains("slack"));
            assert!(!yaml.contains("notifications"));
            assert!(!yaml.contains("sshkey"));
            assert!(!yaml.contains("openshift"));
            assert!(yaml.contains("git@github.com:example/example-com.git"));
        }
    }

    describe "equality" {
        it "ignores the interleaving of channel kinds" {
            let slack = NotificationChannel::Slack {
                name: "s".into(),
                webhook: "https://s".into(),
                channel: "c".into(),
            };
            let email = NotificationChannel::Email {
                name: "e".into(),
                email_address: "ops@example.com".into(),
            };
            let a = Document {
                notifications: vec![slack.clone(), email.clone()],
                ..Default::default()
            };
            let b = Document {
                notifications: vec![email, slack],
                ..Default::default()
            };

            assert_eq!(a, b);
        }

        it "respects order within a kind" {
            let first = NotificationChannel::Email {
                name: "a".into(),
                email_address: "a@example.com".into(),
            };
            let second = NotificationChannel::Email {
                name: "b".into(),
                email_address: "b@example.com".into(),
            };
            let a = Document {
                notifications: vec![first.clone(), second.clone()],
                ..Default::default()
            };
            let b = Document {
                notifications: vec![second, first],
                ..Default::default()
            };

            assert_ne!(a, b);
        }
    }
}
