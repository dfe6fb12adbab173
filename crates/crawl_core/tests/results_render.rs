use crawl_core::{render_results, ResultRecord, TableBody, EMPTY_FIELD, NO_DATA};
use pretty_assertions::assert_eq;

fn full_record() -> ResultRecord {
    ResultRecord {
        bvid: Some("BV1xx411c7mD".to_string()),
        title: Some("Linear algebra, lecture 1".to_string()),
        up_name: Some("mathcat".to_string()),
        view_count: 150_000_000,
        favorite_count: 999,
        tags: Some("algebra".to_string()),
        subject: Some("linear algebra".to_string()),
        category: Some("legacy".to_string()),
    }
}

#[test]
fn empty_input_renders_placeholder_row() {
    let table = render_results(&[]);

    assert_eq!(table.total, 0);
    assert_eq!(table.count_label, "0 results");
    assert_eq!(table.body, TableBody::Placeholder(NO_DATA.to_string()));
    assert!(table.rows().is_empty());
}

#[test]
fn row_fields_are_formatted() {
    let table = render_results(&[full_record()]);
    let row = &table.rows()[0];

    assert_eq!(row.link.label, "BV1xx411c7mD");
    assert_eq!(row.link.href, "https://www.bilibili.com/video/BV1xx411c7mD");
    assert_eq!(row.title, "Linear algebra, lecture 1");
    assert_eq!(row.up_name, "mathcat");
    assert_eq!(row.views, "1.50亿");
    assert_eq!(row.favorites, "999");
    assert_eq!(row.tags, "algebra");
    assert_eq!(row.subject, "linear algebra");
}

#[test]
fn missing_fields_use_placeholders() {
    let record = ResultRecord {
        subject: Some("  ".to_string()),
        category: Some("calculus".to_string()),
        ..ResultRecord::default()
    };
    let table = render_results(&[record, ResultRecord::default()]);
    let rows = table.rows();

    assert_eq!(rows[0].link.label, EMPTY_FIELD);
    assert_eq!(rows[0].link.href, "#");
    assert_eq!(rows[0].title, EMPTY_FIELD);
    assert_eq!(rows[0].views, "0");
    assert_eq!(rows[0].subject, "calculus");
    assert_eq!(rows[1].subject, EMPTY_FIELD);
}

#[test]
fn rendering_is_capped_but_count_is_not() {
    let records: Vec<_> = (0..500)
        .map(|i| ResultRecord {
            bvid: Some(format!("BV{i}")),
            ..ResultRecord::default()
        })
        .collect();
    let table = render_results(&records);

    assert_eq!(table.total, 500);
    assert_eq!(table.count_label, "500 results");
    assert_eq!(table.rows().len(), 200);
    assert_eq!(table.rows()[0].link.label, "BV0");
    assert_eq!(table.rows()[199].link.label, "BV199");
}
