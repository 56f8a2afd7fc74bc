use playlistdl::errors::PlaylistDlError;
use playlistdl::playlist::{
    PlaylistItem, parse_flat_playlist_line, parse_flat_playlist_output, parse_selection,
};

fn selection_error(input: &str, len: usize) -> String {
    match parse_selection(input, len) {
        Err(PlaylistDlError::SelectionError(msg)) => msg,
        Err(e) => panic!("Expected SelectionError, got: {:?}", e),
        Ok(indices) => panic!("Expected error, got {:?}", indices),
    }
}

#[test]
fn test_flat_entry_prefers_url_over_id() {
    let item = parse_flat_playlist_line(
        r#"{"_type": "url", "id": "abc", "url": "https://www.youtube.com/watch?v=abc", "title": "First song"}"#,
    )
    .unwrap();
    assert_eq!(
        item,
        PlaylistItem {
            title: "First song".to_string(),
            identifier: "https://www.youtube.com/watch?v=abc".to_string(),
        }
    );
}

#[test]
fn test_flat_entry_falls_back_to_id_and_title_to_identifier() {
    let item = parse_flat_playlist_line(r#"{"id": "xyz"}"#).unwrap();
    assert_eq!(item.identifier, "xyz");
    assert_eq!(item.title, "xyz");

    let item = parse_flat_playlist_line(r#"{"id": "xyz", "title": "  "}"#).unwrap();
    assert_eq!(item.title, "xyz");
}

#[test]
fn test_unusable_lines_are_skipped() {
    assert!(parse_flat_playlist_line("").is_none());
    assert!(parse_flat_playlist_line("WARNING: something odd").is_none());
    assert!(parse_flat_playlist_line(r#"{"title": "no identifier"}"#).is_none());
    assert!(parse_flat_playlist_line(r#"{"url": ""}"#).is_none());
}

#[test]
fn test_output_keeps_collection_order() {
    let output = concat!(
        r#"{"id": "one", "title": "One"}"#,
        "\n",
        "not json\n",
        r#"{"id": "two", "title": "Two"}"#,
        "\n\n",
        r#"{"id": "three", "title": "Three"}"#,
        "\n",
    );
    let titles: Vec<String> = parse_flat_playlist_output(output)
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
}

#[test]
fn test_select_all() {
    assert_eq!(parse_selection("all", 4).unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(parse_selection("  ALL ", 2).unwrap(), vec![0, 1]);
}

#[test]
fn test_select_numbers_and_ranges() {
    assert_eq!(
        parse_selection("1, 5, 8-10", 12).unwrap(),
        vec![0, 4, 7, 8, 9]
    );
    assert_eq!(parse_selection("3 1-3,2", 5).unwrap(), vec![0, 1, 2]);
    assert_eq!(parse_selection("4-4", 4).unwrap(), vec![3]);
}

#[test]
fn test_bad_selections_are_rejected() {
    assert!(selection_error("5-3", 10).contains("reversed"));
    assert!(selection_error("two", 10).contains("not a number or range"));
    assert!(selection_error("1-x", 10).contains("not a number or range"));
    assert_eq!(selection_error("11", 10), "11 is out of range (1-10)");
    assert_eq!(selection_error("0", 10), "0 is out of range (1-10)");
    assert!(selection_error("8-12", 10).contains("out of range"));
    assert_eq!(selection_error(" , ", 10), "no items selected");
}
