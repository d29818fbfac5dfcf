#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use win_keycode::{Chord, ParseError};

    use crate::*;

    #[test]
    fn full_document_parses() {
        let json = r#"{
            "actions": {
                "Click": { "keyBinding": "Ctrl+Alt+F" },
                "Invoke": { "enabled": false }
            }
        }"#;
        let cfg = load_from_str(json, None).unwrap();
        let click = cfg.action("Click").unwrap();
        assert_eq!(click.key_binding.as_deref(), Some("Ctrl+Alt+F"));
        assert!(click.enabled);
        let invoke = cfg.action("Invoke").unwrap();
        assert!(!invoke.enabled);
        assert_eq!(invoke.key_binding, None);
        assert!(cfg.action("Other").is_none());
    }

    #[test]
    fn empty_document_is_default() {
        let cfg = load_from_str("{}", None).unwrap();
        assert_eq!(cfg, Config::default());
        let cfg = load_from_str(r#"{"actions": {}}"#, None).unwrap();
        assert!(cfg.actions.is_empty());
    }

    #[test]
    fn action_names_are_case_sensitive() {
        let cfg = load_from_str(r#"{"actions": {"click": {"enabled": false}}}"#, None).unwrap();
        assert!(cfg.action("Click").is_none());
        assert!(cfg.action("click").is_some());
    }

    #[test]
    fn parsed_binding_handles_blank_and_invalid() {
        let blank = ActionConfig {
            key_binding: Some("   ".into()),
            enabled: true,
        };
        assert!(blank.parsed_binding().is_none());
        assert!(ActionConfig::default().parsed_binding().is_none());

        let good = ActionConfig {
            key_binding: Some("win+g".into()),
            enabled: true,
        };
        assert_eq!(
            good.parsed_binding(),
            Some(Ok(Chord::parse("Win+G").unwrap()))
        );

        let bad = ActionConfig {
            key_binding: Some("Hyper+G".into()),
            enabled: true,
        };
        assert_eq!(
            bad.parsed_binding(),
            Some(Err(ParseError::UnknownModifier("Hyper".into())))
        );
    }

    #[test]
    fn parse_error_carries_location() {
        let json = "{\n  \"actions\": {\n    \"Click\": { \"enabled\": nope }\n  }\n}";
        let err = load_from_str(json, Some(Path::new("cfg.json"))).unwrap_err();
        match &err {
            Error::Parse {
                kind,
                line,
                col,
                snippet,
                message,
                ..
            } => {
                assert_eq!(*kind, ParseKind::Syntax);
                assert_eq!(*line, 3);
                assert!(*col > 1);
                assert_eq!(snippet, "    \"Click\": { \"enabled\": nope }");
                assert!(!message.contains(" at line "));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let pretty = err.pretty();
        assert!(pretty.starts_with("cfg.json:3:"));
        assert!(pretty.contains("malformed JSON"));
        assert!(pretty.lines().last().unwrap().ends_with('^'));
        assert_eq!(err.path(), Some(Path::new("cfg.json")));
    }

    #[test]
    fn parse_errors_are_classified() {
        let kind = |json: &str| match load_from_str(json, None) {
            Err(Error::Parse { kind, .. }) => kind,
            other => panic!("unexpected result: {other:?}"),
        };
        assert_eq!(kind(r#"{"actions": {"Click": {"enabled": "yes"}}}"#), ParseKind::Data);
        assert_eq!(kind(r#"{"actions": {"Click": {"#), ParseKind::Eof);
        assert_eq!(kind("{ not json }"), ParseKind::Syntax);
    }

    #[test]
    fn unlocated_errors_render_without_a_path() {
        let err = load_from_str("42", None).unwrap_err();
        assert!(err.path().is_none());
        assert!(err.pretty().starts_with("<config>:1:"));
    }

    #[test]
    fn load_or_default_handles_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(load_or_default(&missing), Config::default());
        assert!(matches!(
            load_from_path(&missing),
            Err(Error::Read { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert_eq!(load_or_default(&bad), Config::default());

        let good = dir.path().join("good.json");
        fs::write(&good, r#"{"actions": {"Click": {"keyBinding": "Win+G"}}}"#).unwrap();
        let cfg = load_or_default(&good);
        assert_eq!(
            cfg.action("Click").and_then(|a| a.key_binding.clone()),
            Some("Win+G".to_string())
        );
    }

    #[test]
    fn resolve_prefers_explicit_path() {
        let p = Path::new("/tmp/custom.json");
        assert_eq!(resolve_config_path(Some(p)), p.to_path_buf());
        assert!(resolve_config_path(None).ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn serializes_with_original_field_names() {
        let cfg = Config::default().with_action(
            "Click",
            ActionConfig {
                key_binding: Some("Win+G".into()),
                enabled: false,
            },
        );
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"keyBinding\":\"Win+G\""));
        assert!(json.contains("\"enabled\":false"));
        assert_eq!(load_from_str(&json, None).unwrap(), cfg);
    }
}
