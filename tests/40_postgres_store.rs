//! Store contract against a real PostgreSQL database.
//!
//! Runs only when DATABASE_URL is a postgres:// URL; otherwise each test
//! returns early.

mod common;

use anyhow::Result;
use uuid::Uuid;

use todo_api::database::models::{NewTodo, NewUser, User, UserChanges};
use todo_api::database::{DatabaseError, PgStore, Store};

async fn add_user(store: &PgStore, username: &str) -> Result<User> {
    Ok(store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholde".to_string(),
        })
        .await?)
}

async fn add_todo(store: &PgStore, owner: Uuid, text: &str) -> Result<()> {
    store
        .create_todo(NewTodo {
            user_id: owner,
            text: text.to_string(),
            done: false,
        })
        .await?;
    Ok(())
}

#[tokio::test]
async fn migrate_is_idempotent() -> Result<()> {
    let Some(store) = common::postgres_store().await? else {
        return Ok(());
    };

    store.migrate().await?;
    store.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_username_conflicts_on_create_and_rename() -> Result<()> {
    let Some(store) = common::postgres_store().await? else {
        return Ok(());
    };
    let alice_name = common::unique_name("alice");
    let bob_name = common::unique_name("bob");

    let alice = add_user(&store, &alice_name).await?;
    let bob = add_user(&store, &bob_name).await?;

    let err = add_user(&store, &alice_name).await.unwrap_err();
    assert!(
        matches!(err.downcast_ref::<DatabaseError>(), Some(DatabaseError::Conflict(_))),
        "{}",
        err
    );

    let rename = UserChanges {
        username: Some(alice_name.clone()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_user(bob.id, rename).await,
        Err(DatabaseError::Conflict(_))
    ));

    store.delete_user(alice.id).await?;
    store.delete_user(bob.id).await?;
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_other_fields() -> Result<()> {
    let Some(store) = common::postgres_store().await? else {
        return Ok(());
    };
    let user = add_user(&store, &common::unique_name("carol")).await?;

    let new_name = common::unique_name("caroline");
    let renamed = store
        .update_user(
            user.id,
            UserChanges {
                username: Some(new_name.clone()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(renamed.username, new_name);
    assert_eq!(renamed.password_hash, user.password_hash);
    assert!(renamed.updated_at >= user.updated_at);

    let rehashed = store
        .update_user(
            user.id,
            UserChanges {
                password_hash: Some("new-hash".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(rehashed.username, new_name);
    assert_eq!(rehashed.password_hash, "new-hash");
    assert_eq!(rehashed.created_at, user.created_at);

    let missing = store.update_user(Uuid::new_v4(), UserChanges::default()).await;
    assert!(matches!(missing, Err(DatabaseError::NotFound(_))));

    store.delete_user(user.id).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_user_cascades_to_todos() -> Result<()> {
    let Some(store) = common::postgres_store().await? else {
        return Ok(());
    };
    let dave = add_user(&store, &common::unique_name("dave")).await?;
    let erin = add_user(&store, &common::unique_name("erin")).await?;

    add_todo(&store, dave.id, "d1").await?;
    add_todo(&store, dave.id, "d2").await?;
    add_todo(&store, erin.id, "e1").await?;

    store.delete_user(dave.id).await?;

    assert!(store.find_user(dave.id).await?.is_none());
    assert!(store.list_todos_for_user(dave.id).await?.is_empty());
    assert!(store.list_todos().await?.iter().all(|t| t.user_id != dave.id));
    assert_eq!(store.list_todos_for_user(erin.id).await?.len(), 1);
    assert!(matches!(
        store.delete_user(dave.id).await,
        Err(DatabaseError::NotFound(_))
    ));

    store.delete_user(erin.id).await?;
    Ok(())
}

#[tokio::test]
async fn todo_for_unknown_owner_is_not_found() -> Result<()> {
    let Some(store) = common::postgres_store().await? else {
        return Ok(());
    };

    let result = store
        .create_todo(NewTodo {
            user_id: Uuid::new_v4(),
            text: "orphan".to_string(),
            done: false,
        })
        .await;
    assert!(matches!(result, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn todos_list_in_creation_order() -> Result<()> {
    let Some(store) = common::postgres_store().await? else {
        return Ok(());
    };
    let frank = add_user(&store, &common::unique_name("frank")).await?;

    for text in ["first", "second", "third"] {
        add_todo(&store, frank.id, text).await?;
    }

    let texts: Vec<_> = store
        .list_todos_for_user(frank.id)
        .await?
        .into_iter()
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, ["first", "second", "third"]);

    let todo_id = store.list_todos_for_user(frank.id).await?[0].id;
    store.delete_todo(todo_id).await?;
    assert!(store.find_todo(todo_id).await?.is_none());
    assert!(matches!(
        store.delete_todo(todo_id).await,
        Err(DatabaseError::NotFound(_))
    ));

    store.delete_user(frank.id).await?;
    Ok(())
}
