use super::*;

fn post(id: Option<PostId>, username: Option<&str>, likes: Option<u64>, hearts: Option<u64>) -> Post {
    Post {
        id,
        uid: "u1".into(),
        username: username.map(str::to_owned),
        content: "hello".into(),
        likes,
        hearts,
        icon_url: None,
        creator_uid: None,
    }
}

#[test]
fn empty_posts_render_placeholder() {
    assert_eq!(FeedContent::from_posts(&[]), FeedContent::Placeholder("投稿はまだありません。"));
}

#[test]
fn rows_carry_author_counts_and_both_controls() {
    let content = FeedContent::from_posts(&[post(Some(3), Some("Mika"), Some(5), None)]);
    let FeedContent::Rows(rows) = content else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.post_id, Some(3));
    assert_eq!(row.author, "Mika");
    assert_eq!(
        row.reactions,
        vec![
            ReactionControl { kind: ReactionKind::Like, count: 5 },
            ReactionControl { kind: ReactionKind::Heart, count: 0 },
        ]
    );
}

#[test]
fn row_format_shows_id_author_and_counts() {
    let row = PostRow::from_post(&post(Some(7), None, Some(1), Some(2)));
    assert_eq!(format_row(&row), "[7] u1: hello  👍 1  ❤️ 2");

    let anonymous = PostRow::from_post(&post(None, Some("Ren"), None, None));
    assert_eq!(format_row(&anonymous), "[-] Ren: hello  👍 0  ❤️ 0");
}

#[test]
fn terminal_view_post_input_round_trip() {
    let view = TerminalView::new(true);
    assert!(view.has_posts_container());
    view.set_post_input("  hi  ");
    assert_eq!(view.post_input(), "  hi  ");
    view.clear_post_input();
    assert_eq!(view.post_input(), "");
}
