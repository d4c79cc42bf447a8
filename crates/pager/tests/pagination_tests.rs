use anyhow::Result;
use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use pager::{PAGE_SIZES, ResultPager};
use serde_json::Value;
use std::sync::Arc;

fn numbered_batch(rows: i64) -> Result<RecordBatch> {
    let ids: Vec<i64> = (0..rows).collect();
    let labels: Vec<String> = ids.iter().map(|i| format!("row-{i}")).collect();
    Ok(RecordBatch::try_from_iter(vec![
        ("id", Arc::new(Int64Array::from(ids)) as ArrayRef),
        ("label", Arc::new(StringArray::from(labels)) as ArrayRef),
    ])?)
}

fn ids(rows: &[pager::Row]) -> Vec<i64> {
    rows.iter()
        .map(|r| r["id"].as_i64().expect("id is an integer"))
        .collect()
}

#[test]
fn test_pages_of_237_rows() -> Result<()> {
    let mut pager = ResultPager::default();
    pager.set_batch(numbered_batch(237)?);
    assert_eq!(pager.total_rows(), 237);
    assert_eq!(pager.page_count(), 5);

    let first = pager.page(0, 50)?;
    assert_eq!(first.len(), 50);
    assert_eq!(ids(&first), (0..50).collect::<Vec<_>>());
    assert_eq!(first[7]["label"], Value::String("row-7".to_string()));

    let last = pager.page(4, 50)?;
    assert_eq!(last.len(), 37);
    assert_eq!(ids(&last), (200..237).collect::<Vec<_>>());

    assert!(pager.page(5, 50)?.is_empty());
    assert!(pager.page(usize::MAX, 50)?.is_empty());
    Ok(())
}

#[test]
fn test_page_size_change_clamps_index() -> Result<()> {
    let mut pager = ResultPager::new(50)?;
    pager.set_batch(numbered_batch(237)?);

    assert_eq!(pager.set_page_index(4), 4);
    assert_eq!(pager.set_page_size(100)?, 2);
    assert_eq!(pager.page_index(), 2);

    let page = pager.current_page()?;
    assert_eq!(ids(&page), (200..237).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_set_batch_returns_to_first_page() -> Result<()> {
    let mut pager = ResultPager::new(10)?;
    pager.set_batch(numbered_batch(100)?);
    let _ = pager.set_page_index(6);

    pager.set_batch(numbered_batch(30)?);
    assert_eq!(pager.page_index(), 0);
    assert_eq!(ids(&pager.current_page()?), (0..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_every_allowed_page_size_covers_all_rows() -> Result<()> {
    let mut pager = ResultPager::default();
    pager.set_batch(numbered_batch(237)?);

    for size in PAGE_SIZES {
        let _ = pager.set_page_size(size)?;
        let mut seen = Vec::new();
        for index in 0..pager.page_count() {
            seen.extend(ids(&pager.page(index, size)?));
        }
        assert_eq!(seen, (0..237).collect::<Vec<_>>(), "page size {size}");
    }
    Ok(())
}
