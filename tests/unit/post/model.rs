use super::*;

const SAMPLE: &str = r#"[
  {
    "title": "Morning at the lake",
    "body": "<p>We went out early.</p>",
    "createdAt": "2025-01-24",
    "pictures": ["lake/one.jpg", "./lake/two.jpg"],
    "qrCode": "qr/post-1.png"
  },
  {
    "title": "No frills",
    "createdAt": "2024-12-03"
  }
]"#;

#[test]
fn posts_parse_with_optional_fields() {
    let posts = posts_from_json_str(SAMPLE).unwrap();
    assert_eq!(posts.len(), 2);

    let first = &posts[0];
    assert_eq!(first.title, "Morning at the lake");
    assert_eq!(first.pictures.len(), 2);
    assert_eq!(first.pictures[1].as_str(), "lake/two.jpg");
    assert_eq!(first.qr_code.as_ref().unwrap().as_str(), "qr/post-1.png");

    let second = &posts[1];
    assert!(second.body.is_empty());
    assert!(second.pictures.is_empty());
    assert!(second.qr_code.is_none());
}

#[test]
fn date_label_uses_long_month_without_padding() {
    let posts = posts_from_json_str(SAMPLE).unwrap();
    assert_eq!(posts[0].date_label(), "January 24, 2025");
    assert_eq!(posts[1].date_label(), "December 3, 2024");
}

#[test]
fn layout_pictures_caps_at_max() {
    let mut post = posts_from_json_str(SAMPLE).unwrap().remove(0);
    post.pictures = (0..6)
        .map(|i| ImageRef::new(&format!("p{i}.png")).unwrap())
        .collect();
    assert_eq!(post.layout_pictures(4).len(), 4);
    assert_eq!(post.layout_pictures(4)[3].as_str(), "p3.png");
    assert_eq!(post.layout_pictures(10).len(), 6);
}

#[test]
fn unknown_fields_and_bad_paths_are_rejected() {
    let err = posts_from_json_str(r#"[{ "title": "x", "createdAt": "2025-01-01", "pics": [] }]"#)
        .unwrap_err();
    assert!(matches!(err, StoryError::Serde(_)));

    let err = posts_from_json_str(
        r#"[{ "title": "x", "createdAt": "2025-01-01", "pictures": ["../etc/passwd"] }]"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains(".."));
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("  a//b.png ").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
    assert!(normalize_rel_path("a/../b.png").is_err());
}

#[test]
fn load_posts_reads_file() {
    let dir = std::path::PathBuf::from("target").join("unit_posts");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("posts.json");
    std::fs::write(&path, SAMPLE).unwrap();

    assert_eq!(load_posts(&path).unwrap().len(), 2);
    assert!(load_posts(dir.join("missing.json")).is_err());
}
