//! Integration tests for the `/namecolor` command and its tab completion.

mod common;

use common::{TestContext, received};
use namecolor::host::Sender;
use namecolor::permissions;

#[test]
fn test_set_own_color_requires_permission() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");

    let messages = ctx.command(Sender::Player(alice), &["red"]);
    assert!(received(&messages, Sender::Player(alice), "do not have permission"));
    assert_eq!(ctx.display_name(&alice), "Alice");
    assert!(!ctx.plugin.store().has(&alice));
}

#[test]
fn test_set_own_color_with_node() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, "namecolor.color.red");

    let messages = ctx.command(Sender::Player(alice), &["RED"]);
    assert!(received(&messages, Sender::Player(alice), "Your name color is now"));
    assert_eq!(ctx.display_name(&alice), "§cAlice§r");
    assert_eq!(ctx.list_name(&alice), "§cAlice§r");
    assert_eq!(ctx.plugin.store().get(&alice).as_deref(), Some("red"));
}

#[test]
fn test_unknown_color_lists_available() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, "namecolor.color.gold");

    let messages = ctx.command(Sender::Player(alice), &["pink"]);
    assert!(received(&messages, Sender::Player(alice), "Unknown color"));
    assert!(received(&messages, Sender::Player(alice), "gold"));
    assert!(!received(&messages, Sender::Player(alice), "darkred"));
}

#[test]
fn test_noblack_allows_everything_but_black() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, permissions::COLOR_NO_BLACK);

    let messages = ctx.command(Sender::Player(alice), &["black"]);
    assert!(received(&messages, Sender::Player(alice), "do not have permission"));

    ctx.command(Sender::Player(alice), &["darkpurple"]);
    assert_eq!(ctx.plugin.store().get(&alice).as_deref(), Some("darkpurple"));
}

#[test]
fn test_reset_restores_plain_name() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, permissions::COLOR_ALL);
    ctx.command(Sender::Player(alice), &["aqua"]);

    let messages = ctx.command(Sender::Player(alice), &["reset"]);
    assert!(received(&messages, Sender::Player(alice), "has been reset"));
    assert_eq!(ctx.display_name(&alice), "Alice");
    assert_eq!(ctx.list_name(&alice), "Alice");
    assert!(!ctx.plugin.store().has(&alice));
}

#[test]
fn test_console_cannot_set_own_color() {
    let mut ctx = TestContext::new();
    let messages = ctx.command(Sender::Console, &["red"]);
    assert!(received(&messages, Sender::Console, "Only players"));

    let messages = ctx.command(Sender::Console, &["list"]);
    assert!(received(&messages, Sender::Console, "Only players"));
}

#[test]
fn test_list_without_any_color() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    let messages = ctx.command(Sender::Player(alice), &["list"]);
    assert!(received(&messages, Sender::Player(alice), "do not have access to any colors"));

    ctx.grant(&alice, "namecolor.color.blue");
    let messages = ctx.command(Sender::Player(alice), &["list"]);
    assert!(received(&messages, Sender::Player(alice), "Colors you can use"));
    assert!(received(&messages, Sender::Player(alice), "blue"));
}

#[test]
fn test_help_lines_depend_on_permissions() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");

    let messages = ctx.command(Sender::Player(alice), &[]);
    assert_eq!(messages.len(), 5);
    assert!(!received(&messages, Sender::Player(alice), "Admin commands"));

    ctx.op(&alice);
    let messages = ctx.command(Sender::Player(alice), &["help"]);
    assert!(received(&messages, Sender::Player(alice), "Admin commands"));
    assert!(received(&messages, Sender::Player(alice), "/namecolor reload"));
}

#[test]
fn test_admin_requires_permission() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    let bob = ctx.join("Bob");

    let messages = ctx.command(Sender::Player(alice), &["Bob", "red"]);
    assert!(received(&messages, Sender::Player(alice), "other players' colors"));
    assert!(!ctx.plugin.store().has(&bob));
}

#[test]
fn test_admin_sets_and_resets_other_player() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    let bob = ctx.join("Bob");
    ctx.grant(&alice, permissions::ADMIN);

    let messages = ctx.command(Sender::Player(alice), &["bob", "green"]);
    assert!(received(&messages, Sender::Player(alice), "Set Bob's name color"));
    assert!(received(&messages, Sender::Player(bob), "An admin set your name color"));
    assert_eq!(ctx.display_name(&bob), "§aBob§r");
    assert_eq!(ctx.plugin.store().get(&bob).as_deref(), Some("green"));

    let messages = ctx.command(Sender::Player(alice), &["Bob", "reset"]);
    assert!(received(&messages, Sender::Player(alice), "Reset Bob's name color"));
    assert!(received(&messages, Sender::Player(bob), "An admin reset your name color"));
    assert_eq!(ctx.display_name(&bob), "Bob");
    assert!(!ctx.plugin.store().has(&bob));
}

#[test]
fn test_admin_from_console() {
    let mut ctx = TestContext::new();
    let bob = ctx.join("Bob");

    let messages = ctx.command(Sender::Console, &["Bob", "black"]);
    assert!(received(&messages, Sender::Console, "Set Bob's name color"));
    assert_eq!(ctx.plugin.store().get(&bob).as_deref(), Some("black"));
}

#[test]
fn test_admin_unknown_player_and_color() {
    let mut ctx = TestContext::new();
    ctx.join("Bob");

    let messages = ctx.command(Sender::Console, &["Carol", "red"]);
    assert!(received(&messages, Sender::Console, "Player Carol is not online"));

    let messages = ctx.command(Sender::Console, &["Bob", "pink"]);
    assert!(received(&messages, Sender::Console, "Valid colors"));
}

#[test]
fn test_reload_requires_op() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, permissions::ADMIN);

    let messages = ctx.command(Sender::Player(alice), &["reload"]);
    assert!(received(&messages, Sender::Player(alice), "Only operators"));

    ctx.op(&alice);
    let messages = ctx.command(Sender::Player(alice), &["reload"]);
    assert!(received(&messages, Sender::Player(alice), "reloaded"));

    let messages = ctx.command(Sender::Console, &["reload"]);
    assert!(received(&messages, Sender::Console, "reloaded"));
}

#[test]
fn test_repeated_changes_schedule_one_flush() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, permissions::COLOR_ALL);

    for color in ["red", "blue", "gold", "aqua"] {
        ctx.command(Sender::Player(alice), &[color]);
    }
    assert_eq!(ctx.scheduler.queued(), 1);

    assert_eq!(ctx.scheduler.run_pending(), 1);
    let contents = ctx.data_file_contents();
    assert!(contents.contains(&alice.to_string()));
    assert!(contents.contains("aqua"));
}

#[test]
fn test_tab_complete_first_argument() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.grant(&alice, "namecolor.color.red");
    ctx.grant(&alice, "namecolor.color.darkred");

    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["r"]);
    assert_eq!(suggestions, vec!["red", "reset"]);

    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["d"]);
    assert_eq!(suggestions, vec!["darkred"]);

    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["Re"]);
    assert!(!suggestions.contains(&"reload".to_string()));
}

#[test]
fn test_tab_complete_admin_arguments() {
    let mut ctx = TestContext::new();
    let alice = ctx.join("Alice");
    ctx.join("Bob");

    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["b"]);
    assert!(suggestions.is_empty());
    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["Bob", ""]);
    assert!(suggestions.is_empty());

    ctx.op(&alice);
    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["b"]);
    assert!(suggestions.contains(&"Bob".to_string()));
    assert!(suggestions.contains(&"blue".to_string()));

    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["Bob", "dark"]);
    assert_eq!(suggestions.len(), 6);
    let suggestions = ctx.plugin.on_tab_complete(&ctx.server, Sender::Player(alice), &["Bob", "res"]);
    assert_eq!(suggestions, vec!["reset"]);
}
