mod helpers;

use helpers::ModeBStore;
use sponsorhub::models::{
    SaveAction, SaveOutcome, SchemaModeName, TemplateForm, TemplateScope, TenantSelector,
};
use sponsorhub::services::{load_templates, save_template};

/// Full round against a backend that only has the older column layout: the
/// insert and the load must both discover it and still agree on the result.
#[tokio::test]
async fn test_insert_then_load_against_an_older_layout_backend() {
    let store = ModeBStore::new();

    let form = TemplateForm {
        id: None,
        tenant_id: None,
        key: "invitation".to_string(),
        subject: "Hi {{name}}".to_string(),
        html: "<p>{{name}}</p>".to_string(),
        text_body: None,
    };

    let outcome = save_template(&store, &form).await;
    let saved = match outcome {
        SaveOutcome::Saved(saved) => saved,
        SaveOutcome::Failed(failure) => panic!("save failed: {:?}", failure.error),
    };
    assert_eq!(saved.mode, SchemaModeName::B);
    assert_eq!(saved.action, SaveAction::Insert);
    assert!(saved.id.is_some());

    let load = load_templates(&store, &TenantSelector::GlobalOnly).await;
    assert_eq!(load.mode, SchemaModeName::B);
    assert!(load.error.is_none());
    assert_eq!(load.rows.len(), 1);

    let row = &load.rows[0];
    assert_eq!(row.scope, TemplateScope::Global);
    assert_eq!(row.key, "invitation");
    assert_eq!(row.subject, "Hi {{name}}");
    assert_eq!(row.html, "<p>{{name}}</p>");
    assert_eq!(row.id, saved.id);
}

/// A club-scoped load against the same backend unions the global defaults
/// with the club's own templates.
#[tokio::test]
async fn test_club_load_against_an_older_layout_backend() {
    let store = ModeBStore::new();

    let global = TemplateForm {
        id: None,
        tenant_id: None,
        key: "invitation".to_string(),
        subject: "Hi".to_string(),
        html: "<p>hello</p>".to_string(),
        text_body: None,
    };
    let club = TemplateForm {
        id: None,
        tenant_id: Some("club-7".to_string()),
        key: "invitation".to_string(),
        subject: "Hi from the club".to_string(),
        html: "<p>club hello</p>".to_string(),
        text_body: None,
    };
    let other_club = TemplateForm {
        id: None,
        tenant_id: Some("club-9".to_string()),
        key: "invitation".to_string(),
        subject: "Other".to_string(),
        html: "<p>other</p>".to_string(),
        text_body: None,
    };

    assert!(save_template(&store, &global).await.is_saved());
    assert!(save_template(&store, &club).await.is_saved());
    assert!(save_template(&store, &other_club).await.is_saved());

    let load = load_templates(&store, &TenantSelector::Club("club-7".to_string())).await;
    assert_eq!(load.rows.len(), 2);
    assert!(load
        .rows
        .iter()
        .any(|row| row.scope == TemplateScope::Global));
    assert!(load
        .rows
        .iter()
        .all(|row| row.tenant_id.as_deref() != Some("club-9")));
}

/// Updating an existing row goes through the same layout discovery.
#[tokio::test]
async fn test_update_against_an_older_layout_backend() {
    let store = ModeBStore::new();

    let form = TemplateForm {
        id: None,
        tenant_id: None,
        key: "reminder_5d".to_string(),
        subject: "Soon".to_string(),
        html: "<p>soon</p>".to_string(),
        text_body: None,
    };
    let saved = match save_template(&store, &form).await {
        SaveOutcome::Saved(saved) => saved,
        SaveOutcome::Failed(failure) => panic!("insert failed: {:?}", failure.error),
    };

    let update = TemplateForm {
        id: saved.id.clone(),
        tenant_id: None,
        key: "reminder_5d".to_string(),
        subject: "Very soon".to_string(),
        html: "<p>very soon</p>".to_string(),
        text_body: None,
    };
    let updated = match save_template(&store, &update).await {
        SaveOutcome::Saved(saved) => saved,
        SaveOutcome::Failed(failure) => panic!("update failed: {:?}", failure.error),
    };
    assert_eq!(updated.action, SaveAction::Update);
    assert_eq!(updated.mode, SchemaModeName::B);

    let load = load_templates(&store, &TenantSelector::GlobalOnly).await;
    assert_eq!(load.rows.len(), 1);
    assert_eq!(load.rows[0].subject, "Very soon");
}
