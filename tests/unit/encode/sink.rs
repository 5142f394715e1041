use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        title: "posts".to_string(),
        page: PageSize::new(612.0, 792.0).unwrap(),
        scale: 2.0,
    }
}

fn page(fill: u8) -> PageRGBA {
    PageRGBA {
        width: 1,
        height: 1,
        data: vec![fill, fill, fill, 255],
        premultiplied: true,
    }
}

#[test]
fn sink_config_rejects_bad_scale() {
    let mut c = cfg();
    c.scale = 0.0;
    assert!(c.validate().is_err());
    c.scale = f64::NAN;
    assert!(c.validate().is_err());
    assert!(cfg().validate().is_ok());
}

#[test]
fn in_memory_sink_keeps_pages_in_push_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_page(0, &page(10)).unwrap();
    sink.push_page(1, &page(20)).unwrap();
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(&cfg()));
    let indices: Vec<_> = sink.pages().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, [0, 1]);
    assert_eq!(sink.pages()[1].1.data[0], 20);
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_page(0, &page(0)).is_err());
    assert!(sink.pages().is_empty());
}

#[test]
fn begin_resets_previous_run() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_page(0, &page(1)).unwrap();
    sink.end().unwrap();

    sink.begin(cfg()).unwrap();
    assert!(sink.pages().is_empty());
    assert!(!sink.is_ended());
}
