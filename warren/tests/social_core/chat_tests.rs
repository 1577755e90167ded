use super::support::*;
use warren::MessagesView;

#[tokio::test]
async fn chat_list_has_one_conversation_per_counterpart() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    let bob = seed_profile(&store, "bob", "bob").await;
    seed_profile(&store, "carol", "carol").await;

    actions::send_message(&store, &alice, "bob", "hi bob").await.expect("send");
    actions::send_message(&store, &bob, "alice", "hi alice").await.expect("send");
    actions::send_message(&store, &alice, "carol", "hi carol").await.expect("send");

    let mut view = MessagesView::subscribe(&store, "alice").await.expect("subscribe");
    let conversations = view.conversations().await;

    assert_eq!(conversations.len(), 2);
    // Last write wins the top slot: the carol message is the newest overall.
    assert_eq!(conversations[0].counterpart_id, "carol");
    assert_eq!(conversations[0].counterpart_username, "carol");
    assert_eq!(conversations[0].last_content, "hi carol");
    // The bob conversation reports bob's reply, its latest message.
    assert_eq!(conversations[1].counterpart_id, "bob");
    assert_eq!(conversations[1].last_content, "hi alice");
    assert!(conversations[0].last_at > conversations[1].last_at);
}

#[tokio::test]
async fn chat_list_is_scoped_to_the_viewer() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    seed_profile(&store, "bob", "bob").await;
    seed_profile(&store, "carol", "carol").await;

    actions::send_message(&store, &alice, "bob", "for bob").await.expect("send");
    actions::send_message(&store, &alice, "carol", "for carol").await.expect("send");

    let mut view = MessagesView::subscribe(&store, "bob").await.expect("subscribe");
    let conversations = view.conversations().await;

    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].counterpart_id, "alice");
    assert_eq!(conversations[0].last_content, "for bob");
}

#[tokio::test]
async fn counterpart_without_profile_is_skipped_not_fatal() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    seed_profile(&store, "bob", "bob").await;

    actions::send_message(&store, &alice, "bob", "hello").await.expect("send");
    actions::send_message(&store, &alice, "stranger", "anyone there?").await.expect("send");

    let mut view = MessagesView::subscribe(&store, "alice").await.expect("subscribe");
    let conversations = view.conversations().await;

    // The stranger has no profile document; that conversation is dropped
    // while the rest of the list survives.
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].counterpart_id, "bob");
}

#[tokio::test]
async fn chat_list_updates_when_a_message_arrives() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    let bob = seed_profile(&store, "bob", "bob").await;

    actions::send_message(&store, &alice, "bob", "first").await.expect("send");

    let mut view = MessagesView::subscribe(&store, "alice").await.expect("subscribe");
    assert_eq!(view.conversations().await[0].last_content, "first");

    actions::send_message(&store, &bob, "alice", "second").await.expect("send");
    let conversations = view.changed().await.expect("delivery");
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].last_content, "second");
}

#[tokio::test]
async fn starting_a_chat_sends_the_greeting() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    seed_profile(&store, "bob", "bob").await;

    actions::start_chat(&store, &alice, "bob").await.expect("start chat");

    let mut view = MessagesView::subscribe(&store, "bob").await.expect("subscribe");
    let conversations = view.conversations().await;
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].last_content, "Hi! I'd like to connect with you.");
    assert_eq!(conversations[0].counterpart_username, "alice");
}
