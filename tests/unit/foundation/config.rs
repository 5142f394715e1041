use super::*;

#[test]
fn defaults_match_letter_layout() {
    let cfg = LayoutConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.page_size(), PageSize {
        width: 612.0,
        height: 792.0
    });
    assert_eq!(cfg.text_width(), 548.0);
    assert_eq!(cfg.image_width_cap(), 531.0);
    assert_eq!(cfg.char_limit(false), 2500);
    assert_eq!(cfg.char_limit(true), 1000);
    assert_eq!(cfg.bottom_margin(false), 32.0);
    assert_eq!(cfg.bottom_margin(true), 100.0);
    assert_eq!(cfg.date_color, Rgb8::new(128, 128, 128));
}

#[test]
fn image_cap_shrinks_to_text_column() {
    let cfg = LayoutConfig {
        page_width: 400.0,
        ..LayoutConfig::default()
    };
    assert_eq!(cfg.image_width_cap(), 336.0);
}

#[test]
fn validate_rejects_bad_layouts() {
    let bad = [
        LayoutConfig {
            page_width: 0.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            margin_left: 400.0,
            margin_right: 400.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            margin_top: 700.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            char_limit_with_images: 0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            max_images: 5,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            max_images: 0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            qr_size: 120.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            body_size: 0.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            image_gap: -1.0,
            ..LayoutConfig::default()
        },
    ];
    for cfg in bad {
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("validation error:"), "{err}");
    }
}

#[test]
fn json_config_fills_defaults() {
    let cfg = StoryConfig::from_json_str(
        r##"{ "layout": { "image_gap": 12, "date_color": "#333333" }, "render": { "scale": 1.5 } }"##,
    )
    .unwrap();
    assert_eq!(cfg.layout.image_gap, 12.0);
    assert_eq!(cfg.layout.date_color, Rgb8::new(0x33, 0x33, 0x33));
    assert_eq!(cfg.layout.margin_top, 32.0);
    assert_eq!(cfg.render.scale, 1.5);
    assert_eq!(cfg.render.background, Rgb8::WHITE);
    assert_eq!(cfg.output, PathBuf::from("res").join("output.pdf"));
    assert!(cfg.fonts.is_none());
}

#[test]
fn json_config_rejects_unknown_fields_and_invalid_values() {
    let err = StoryConfig::from_json_str(r#"{ "layuot": {} }"#).unwrap_err();
    assert!(matches!(err, StoryError::Serde(_)));

    let err = StoryConfig::from_json_str(r#"{ "render": { "scale": 0 } }"#).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));
}

#[test]
fn from_path_resolves_fonts_relative_to_config() {
    let dir = PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("storypress.json");
    std::fs::write(
        &path,
        r#"{ "fonts": { "regular": "fonts/Regular.ttf", "bold": "/abs/Bold.ttf" } }"#,
    )
    .unwrap();

    let cfg = StoryConfig::from_path(&path).unwrap();
    let fonts = cfg.fonts.unwrap();
    assert_eq!(fonts.regular, dir.join("fonts/Regular.ttf"));
    assert_eq!(fonts.bold, PathBuf::from("/abs/Bold.ttf"));
}

#[test]
fn from_path_reports_missing_file() {
    let err = StoryConfig::from_path("target/unit_config/does-not-exist.json").unwrap_err();
    assert!(err.to_string().contains("does-not-exist.json"));
}

#[test]
fn from_path_validates_what_it_loads() {
    let dir = PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad_scale.json");
    std::fs::write(&path, r#"{ "render": { "scale": 0.0 } }"#).unwrap();

    let err = StoryConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)), "{err}");
    StoryConfig::default().validate().unwrap();
}
