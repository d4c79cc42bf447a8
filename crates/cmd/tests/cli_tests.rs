use anyhow::Result;
use cmd::{
    LensContext, OutputFormat, QueryArgs, add_command, list_command, paste_command, query_command,
    rm_command,
};
use lens::FileFormat;
use std::path::Path;
use tempfile::tempdir;

fn context(home: &Path) -> LensContext {
    let _ = env_logger::builder().is_test(true).try_init();
    LensContext {
        home: Some(home.to_path_buf()),
        offline: true,
    }
}

fn output(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap_or_default()
}

async fn query(ctx: &LensContext, args: &QueryArgs) -> Result<String> {
    let session = ctx.open_session().await?;
    let mut out = Vec::new();
    query_command(&session, args, &mut out).await?;
    Ok(output(out))
}

#[tokio::test]
async fn test_add_query_across_invocations() -> Result<()> {
    let home = tempdir()?;
    let data = tempdir()?;
    let ctx = context(home.path());

    let mut csv = String::from("id,label\n");
    for i in 0..237 {
        csv.push_str(&format!("{i},item {i}\n"));
    }
    let path = data.path().join("Stock Levels.csv");
    std::fs::write(&path, csv)?;

    {
        let mut session = ctx.open_session().await?;
        let mut out = Vec::new();
        let id = add_command(&mut session, &path, None, Some("ds_stock"), &mut out).await?;
        assert_eq!(id, "ds_stock");
        assert!(output(out).contains("Added table stock_levels (ds_stock)"));
    }

    // A new invocation starts from a fresh engine
    let mut args = QueryArgs::new("SELECT * FROM stock_levels ORDER BY id");
    args.page = 5;
    let text = query(&ctx, &args).await?;
    assert!(text.ends_with("page 5/5 (237 rows)\n"), "{text}");
    assert!(text.contains("| 236 | item 236 |"), "{text}");

    // Past the end clamps to the last page
    args.page = 40;
    args.page_size = Some(100);
    let text = query(&ctx, &args).await?;
    assert!(text.ends_with("page 3/3 (237 rows)\n"), "{text}");
    Ok(())
}

#[tokio::test]
async fn test_paste_json_output() -> Result<()> {
    let home = tempdir()?;
    let ctx = context(home.path());

    let mut session = ctx.open_session().await?;
    let mut out = Vec::new();
    let _ = paste_command(
        &mut session,
        "{\"city\": \"Oslo\", \"pop\": 709000}\n{\"city\": \"Bergen\", \"pop\": 291000}\n",
        "cities",
        None,
        &mut out,
    )
    .await?;

    let args = QueryArgs {
        sql: "SELECT city FROM cities ORDER BY pop DESC".to_string(),
        page: 1,
        page_size: Some(10),
        format: OutputFormat::Json,
    };
    let text = query(&ctx, &args).await?;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(r#"{"city":"Oslo"}"#));
    assert_eq!(lines.next(), Some(r#"{"city":"Bergen"}"#));
    Ok(())
}

#[tokio::test]
async fn test_blank_paste_is_refused() -> Result<()> {
    let home = tempdir()?;
    let mut session = context(home.path()).open_session().await?;
    let mut out = Vec::new();
    let result = paste_command(&mut session, "  \n", "empty", Some(FileFormat::Csv), &mut out).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_rm_and_list() -> Result<()> {
    let home = tempdir()?;
    let data = tempdir()?;
    let ctx = context(home.path());
    let path = data.path().join("a.tsv");
    std::fs::write(&path, "x\ty\n1\t2\n")?;

    {
        let mut session = ctx.open_session().await?;
        let mut out = Vec::new();
        let _ = add_command(&mut session, &path, Some("pairs"), Some("ds_pairs"), &mut out).await?;
    }

    {
        let session = ctx.open_session().await?;
        let mut out = Vec::new();
        list_command(&session, &mut out).await?;
        let text = output(out);
        assert!(text.starts_with("ds_pairs table pairs (a.tsv, "), "{text}");
    }

    {
        let mut session = ctx.open_session().await?;
        let mut out = Vec::new();
        rm_command(&mut session, "ds_pairs", &mut out).await?;
        assert_eq!(output(out), "Removed pairs (ds_pairs)\n");
    }

    let session = ctx.open_session().await?;
    assert!(session.state.data_sources.is_empty());
    let mut out = Vec::new();
    list_command(&session, &mut out).await?;
    assert_eq!(output(out), "No data sources\n");

    let mut session = session;
    let mut out = Vec::new();
    assert!(rm_command(&mut session, "ds_pairs", &mut out).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_failed_load_is_listed() -> Result<()> {
    let home = tempdir()?;
    let ctx = context(home.path());

    // Bytes that made it to the store but no longer parse
    let store = filestore::DirFileStore::open(home.path().join("files")).await?;
    filestore::FileStore::put(&store, "ds_bad", "bad.json", "bad", b"[{\"a\": ").await?;

    let session = ctx.open_session().await?;
    assert_eq!(session.report.failed.len(), 1);
    let mut out = Vec::new();
    list_command(&session, &mut out).await?;
    assert!(output(out).starts_with("ds_bad bad not loaded: "));
    Ok(())
}
