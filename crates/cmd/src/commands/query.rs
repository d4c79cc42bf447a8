// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use pager::{Cell, PAGE_SIZES, QueryPager, ResultPager, Row, render_cell};
use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;

use crate::common::Session;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// One JSON object per row
    Json,
}

#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub sql: String,
    /// 1-based page to show; clamped to the last page
    pub page: usize,
    /// Rows per page, defaults to the configured size
    pub page_size: Option<usize>,
    pub format: OutputFormat,
}

impl QueryArgs {
    #[must_use]
    pub fn new<S: Into<String>>(sql: S) -> Self {
        Self {
            sql: sql.into(),
            page: 1,
            page_size: None,
            format: OutputFormat::Table,
        }
    }
}

pub async fn query_command(session: &Session, args: &QueryArgs, out: &mut dyn Write) -> Result<()> {
    let page_size = args.page_size.unwrap_or(session.config.page_size);
    if !PAGE_SIZES.contains(&page_size) {
        anyhow::bail!("page size must be one of {PAGE_SIZES:?}");
    }

    let pager = Mutex::new(QueryPager::new(page_size, session.config.reset_delay)?);
    let _ = pager
        .lock()
        .map_err(|_| anyhow::anyhow!("pager lock poisoned"))?
        .on_query_text(&args.sql, Instant::now());

    let applied = session.lens.run_query(&args.sql, &pager).await?;
    debug!("Query result applied: {applied}");

    let mut pager = pager
        .into_inner()
        .map_err(|_| anyhow::anyhow!("pager lock poisoned"))?;
    let pages = pager.pager_mut();
    let _ = pages.set_page_index(args.page.saturating_sub(1));
    let rows = pages.current_page()?;

    match args.format {
        OutputFormat::Table => write_table(pages, &rows, out)?,
        OutputFormat::Json => {
            for row in &rows {
                writeln!(out, "{}", serde_json::to_string(row)?)?;
            }
        }
    }

    let state = pages.state();
    writeln!(
        out,
        "page {}/{} ({} rows)",
        state.page_index + 1,
        pages.page_count().max(1),
        state.total_rows
    )?;
    Ok(())
}

fn cell_text(cell: Cell<'_>) -> String {
    match cell {
        Cell::Null => "NULL".to_string(),
        Cell::Markdown(body) => body.replace('\n', " "),
        Cell::Text { text, .. } => text.replace('\n', " "),
    }
}

fn write_table(pages: &ResultPager, rows: &[Row], out: &mut dyn Write) -> Result<()> {
    let Some(schema) = pages.schema() else {
        return Ok(());
    };
    let headers: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map_or_else(String::new, |v| cell_text(render_cell(v))))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}", w = *w))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    writeln!(out, "{}", render(&headers))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "|-{}-|", rule.join("-|-"))?;
    for line in &cells {
        writeln!(out, "{}", render(line))?;
    }
    Ok(())
}
