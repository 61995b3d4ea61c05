use searchflow::core::transform::{
    template::placeholder_names, ExpressionVar, InputMapEntry, MultiExpressionForm, Transform,
    TransformDraft, TransformEngine, TransformError, TransformType,
};
use serde_json::json;

fn prompt(a: Option<&str>, b: Option<&str>) -> Transform {
    let mut vars = Vec::new();
    if let Some(a) = a {
        vars.push(ExpressionVar::new("a", Transform::literal(a)));
    }
    if let Some(b) = b {
        vars.push(ExpressionVar::new("b", Transform::literal(b)));
    }
    Transform::template("{{a}}-{{b}}", vars)
}

#[test]
fn bound_template_resolves_to_concatenation() {
    let engine = TransformEngine::default();
    let resolved = engine.resolve(&prompt(Some("X"), Some("Y"))).unwrap();
    assert_eq!(resolved.value.as_deref(), Some("X-Y"));
    assert_eq!(resolved.transform_type, TransformType::Template);
    assert!(!resolved.is_parametrized());
}

#[test]
fn missing_binding_names_the_variable() {
    let engine = TransformEngine::default();
    let err = engine.resolve(&prompt(Some("X"), None)).unwrap_err();
    assert_eq!(
        err,
        TransformError::UnresolvedVariable {
            name: "b".to_string()
        }
    );
    assert_eq!(err.code(), "TRANSFORM-001");
}

#[test]
fn template_without_bindings_rejects_placeholders() {
    let engine = TransformEngine::default();
    let mut bare = Transform::template("{{a}}-{{b}}", Vec::new());
    for nested_vars in [Some(Vec::new()), None] {
        bare.nested_vars = nested_vars;
        let unresolved = TransformError::UnresolvedVariable {
            name: "a".to_string(),
        };
        assert_eq!(engine.resolve(&bare).unwrap_err(), unresolved);
        assert_eq!(engine.validate(&bare).unwrap_err(), unresolved);
    }

    let plain = Transform::template("no placeholders", Vec::new());
    assert_eq!(engine.resolve(&plain).unwrap(), plain);
    assert!(engine.validate(&Transform::literal("{{kept}}")).is_ok());
}

#[test]
fn resolution_is_idempotent() {
    let engine = TransformEngine::default();
    let transforms = vec![
        prompt(Some("X"), Some("Y")),
        Transform::field("passage_text"),
        Transform::expression("$.hits.hits[*]._source"),
        Transform::literal("plain"),
        Transform::empty(TransformType::Template).optional(),
    ];
    for transform in transforms {
        let once = engine.resolve(&transform).unwrap();
        let twice = engine.resolve(&once).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn nesting_deeper_than_the_engine_allows_fails() {
    let engine = TransformEngine::new(2);
    let mut transform = Transform::literal("leaf");
    for _ in 0..2 {
        transform = Transform::template("({{v}})", vec![ExpressionVar::new("v", transform)]);
    }
    assert_eq!(
        engine.resolve(&transform).unwrap().value.as_deref(),
        Some("((leaf))")
    );

    let deeper = Transform::template("{{v}}", vec![ExpressionVar::new("v", transform)]);
    assert_eq!(
        engine.resolve(&deeper).unwrap_err(),
        TransformError::DepthExceeded { max: 2 }
    );
}

#[test]
fn empty_required_variable_is_reported() {
    let engine = TransformEngine::default();
    let transform = Transform::template(
        "{{q}}",
        vec![ExpressionVar::new("q", Transform::empty(TransformType::Expression))],
    );
    assert_eq!(
        engine.resolve(&transform).unwrap_err(),
        TransformError::MissingValue {
            variable: Some("q".to_string())
        }
    );

    let optional = Transform::template(
        "[{{q}}]",
        vec![ExpressionVar::new(
            "q",
            Transform::empty(TransformType::Expression).optional(),
        )],
    );
    assert_eq!(engine.resolve(&optional).unwrap().value.as_deref(), Some("[]"));
}

#[test]
fn unterminated_placeholder_is_malformed() {
    let engine = TransformEngine::default();
    let transform = Transform::template(
        "Hello {{name",
        vec![ExpressionVar::new("name", Transform::literal("x"))],
    );
    assert!(matches!(
        engine.resolve(&transform),
        Err(TransformError::MalformedTemplate { .. })
    ));
}

#[test]
fn bare_string_variable_deserializes_as_expression() {
    let transform: Transform = serde_json::from_value(json!({
        "transformType": "Template",
        "value": "Summarize {{doc}}",
        "nestedVars": [{"name": "doc", "transform": "$.text"}]
    }))
    .unwrap();
    assert_eq!(transform.vars()[0].transform, Transform::expression("$.text"));
    assert_eq!(
        placeholder_names(transform.value.as_deref().unwrap()).unwrap(),
        vec!["doc"]
    );
}

#[test]
fn validate_requires_values_and_jsonpath_expressions() {
    let engine = TransformEngine::default();
    assert_eq!(
        engine.validate(&Transform::empty(TransformType::Field)),
        Err(TransformError::MissingValue { variable: None })
    );
    assert!(engine
        .validate(&Transform::empty(TransformType::Field).optional())
        .is_ok());
    assert!(matches!(
        engine.validate(&Transform::expression("title")),
        Err(TransformError::InvalidExpression { .. })
    ));
    assert!(engine.validate(&Transform::expression("$.title")).is_ok());
}

#[test]
fn resolve_map_keeps_row_order_and_skips_blank_optionals() {
    let engine = TransformEngine::default();
    let rows = vec![
        InputMapEntry::new("text", Transform::field("body")),
        InputMapEntry::new("hint", Transform::empty(TransformType::String).optional()),
        InputMapEntry::new("prompt", prompt(Some("Q"), Some("A"))),
    ];
    let resolved = engine.resolve_map(&rows).unwrap();
    assert_eq!(
        resolved.into_iter().collect::<Vec<_>>(),
        vec![
            ("text".to_string(), "body".to_string()),
            ("prompt".to_string(), "Q-A".to_string()),
        ]
    );
}

#[test]
fn draft_edit_keeps_the_transform_resolvable() {
    let engine = TransformEngine::default();
    let mut draft = TransformDraft::deconstruct(&prompt(Some("X"), None));
    draft.bind("b", Transform::literal("Z"));
    assert_eq!(
        engine.resolve(&draft.reconstruct()).unwrap().value.as_deref(),
        Some("X-Z")
    );
}

#[test]
fn multi_expression_form_validates_every_expression() {
    let engine = TransformEngine::default();
    let mut form = MultiExpressionForm::default();
    form.push("answer", "$.choices[0].message.content");
    assert!(form.validate(&engine).is_ok());

    form.push("", "$.usage");
    assert_eq!(
        form.validate(&engine),
        Err(TransformError::MissingValue { variable: None })
    );

    let mut form = MultiExpressionForm::default();
    form.push("score", "score");
    assert!(matches!(
        form.validate(&engine),
        Err(TransformError::InvalidExpression { .. })
    ));
}
