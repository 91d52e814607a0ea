use crate::config::{notifications_key, POSTS_KEY, USERS_KEY};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::follow::toggle_follow;
use crate::models::models::{Post, User};
use crate::posts::create_post;
use crate::users::{create_user, get_users};

/// Make sure the Chatter collections exist so first reads see `[]`.
pub fn initialize_collections(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    if store.get(USERS_KEY)?.is_none() {
        store.set_json(USERS_KEY, &Vec::<User>::new())?;
    }
    if store.get(POSTS_KEY)?.is_none() {
        store.set_json(POSTS_KEY, &Vec::<Post>::new())?;
    }
    Ok(())
}

struct DemoUser {
    username: &'static str,
    password: &'static str,
    posts: &'static [(&'static str, &'static str)],
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "test",
        password: "test123",
        posts: &[("https://picsum.photos/seed/chatter-test/600/600", "First post on Chatter!")],
    },
    DemoUser {
        username: "alice",
        password: "alice123",
        posts: &[
            ("https://picsum.photos/seed/chatter-alice-1/600/600", "Morning coffee and a good book."),
            ("https://picsum.photos/seed/chatter-alice-2/600/600", "Just finished an amazing project. Feeling productive today!"),
        ],
    },
    DemoUser {
        username: "bob",
        password: "bob123",
        posts: &[("https://picsum.photos/seed/chatter-bob/600/600", "Hey everyone! Just joined, looking forward to connecting.")],
    },
];

/// Populate an empty store with a few users and posts. `test` follows `bob`.
/// Does nothing once any user exists.
pub fn seed_demo_data(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    if !get_users(store)?.is_empty() {
        return Ok(());
    }

    let mut ids = Vec::with_capacity(DEMO_USERS.len());
    for demo in DEMO_USERS {
        let email = format!("{}@chatter.local", demo.username);
        let user = create_user(store, &email, demo.username, demo.password)?;
        for (image, caption) in demo.posts {
            create_post(store, &user.id, image, caption)?;
        }
        ids.push(user.id);
    }

    toggle_follow(store, &ids[0], &ids[2])?;

    tracing::info!(users = ids.len(), "demo data seeded");
    Ok(())
}

/// Remove every Chatter record: users, posts and each user's notifications.
pub fn reset(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    for user in get_users(store)? {
        store.delete(&notifications_key(&user.id))?;
    }
    store.delete(USERS_KEY)?;
    store.delete(POSTS_KEY)?;
    Ok(())
}
