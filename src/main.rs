use anyhow::Context;
use clap::Parser;
use cleanup_ocr_rust::{cli, collaborators, config, export, logging, review, store, submission};
use cli::{Cli, Commands, SchemaAction};
use collaborators::{HttpCollaborator, SchemaClient};
use config::Config;
use dialoguer::Confirm;
use export::ExportCoordinator;
use indicatif::{ProgressBar, ProgressStyle};
use review::{interactive, ReviewSession};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::PersistentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::New { meta } => {
            println!("📝 cleanup-ocr - 新規提出\n");

            let cleanup_data = submission::parse_metadata(&meta)?;
            let store = PersistentStore::open(&config);

            if let Some(existing) = store.get().await {
                println!("進行中の提出（{}枚）を置き換えます", existing.image_count());
            }
            let record = submission::start_submission(&store, cleanup_data).await;

            println!("✔ 提出データを作成しました（活動情報 {}項目）", record.cleanup_data.len());
            warn_if_not_persistent(&store);
        }

        Commands::Upload { folder, meta } => {
            println!("📤 cleanup-ocr - アップロード\n");

            let fallback = submission::parse_metadata(&meta)?;
            let store = PersistentStore::open(&config);
            let client = HttpCollaborator::from_config(&config)?;

            let spinner = spinner(format!("{} をアップロード中...", folder.display()));
            let result = submission::upload_folder(&store, &client, &folder, fallback).await;
            spinner.finish_and_clear();

            let record = result?;
            println!("✔ {}枚のOCR結果を取り込みました", record.image_count());
            if record.issue_count() > 0 {
                println!("⚠ 要確認のフィールドが {}件 あります（review で確認してください）", record.issue_count());
            }
            warn_if_not_persistent(&store);
        }

        Commands::Status => {
            let store = PersistentStore::open(&config);
            match store.get().await {
                Some(record) => {
                    println!("進行中の提出:");
                    for (name, value) in &record.cleanup_data {
                        match value.as_str() {
                            Some(text) => println!("  {}: {}", name, text),
                            None => println!("  {}: {}", name, value),
                        }
                    }
                    println!("  画像: {}枚", record.image_count());
                    println!("  要確認: {}件", record.issue_count());
                }
                None => println!("進行中の提出はありません"),
            }
        }

        Commands::Review { start, output } => {
            println!("🔍 cleanup-ocr - レビュー\n");

            let store = PersistentStore::open(&config);
            let mut session = ReviewSession::load(store.clone()).await;

            if let Some(start) = start {
                let delta = start.saturating_sub(1) as isize - session.current_index() as isize;
                session.go_to(delta).await?;
            }

            let exit = interactive::run_interactive_review(&mut session).await?;
            if exit == interactive::ReviewExit::Submit {
                submit(&config, store, &mut session, output).await?;
            }
        }

        Commands::Submit { output } => {
            println!("📊 cleanup-ocr - 提出\n");

            let store = PersistentStore::open(&config);
            let mut session = ReviewSession::load(store.clone()).await;
            submit(&config, store, &mut session, output).await?;
        }

        Commands::Reset { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("進行中の提出を破棄しますか？")
                    .default(false)
                    .interact()
                    .context("確認の入力に失敗しました")?;

            if confirmed {
                let store = PersistentStore::open(&config);
                store.clear().await;
                store.clear_legacy().await;
                println!("✔ 進行中の提出を破棄しました");
            }
        }

        Commands::Schema { action } => {
            let client = HttpCollaborator::from_config(&config)?;

            match action {
                SchemaAction::Show { json } => {
                    let schema = client.fetch_schema().await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&schema)?);
                    } else {
                        print_schema(&schema);
                    }
                }
                SchemaAction::Set { file } => {
                    let content = std::fs::read_to_string(&file)
                        .with_context(|| format!("読み込めません: {}", file.display()))?;
                    let schema = cleanup_ocr_common::FormSchema::from_json(&content)?;
                    let updated = client.update_schema(&schema).await?;
                    println!("✔ カテゴリ定義を更新しました（{}カテゴリ / {}項目）",
                        updated.categories.len(), updated.field_count());
                }
            }
        }

        Commands::Config { set_api_url, storage, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ APIのURLを設定しました");
            }

            if let Some(enabled) = storage {
                config.storage_enabled = enabled;
                config.save()?;
                println!("✔ ローカル保存を{}にしました", if enabled { "有効" } else { "無効" });
            }

            if show {
                println!("設定:");
                println!("  API URL: {}", config.get_api_url().unwrap_or_else(|_| "未設定".into()));
                println!("  ローカル保存: {}", if config.storage_enabled { "有効" } else { "無効" });
                match config.data_dir() {
                    Ok(dir) => println!("  保存先: {}", dir.display()),
                    Err(e) => println!("  保存先: {}", e),
                }
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }

        Commands::Doctor => {
            println!("🩺 cleanup-ocr - 診断\n");

            let store = PersistentStore::open(&config);
            println!("  ローカル保存: {}", if store.is_available() { "✔ 利用可能" } else { "✘ 利用不可" });

            match HttpCollaborator::from_config(&config) {
                Ok(client) => match client.health().await {
                    Ok(()) => println!("  API ({}): ✔ 応答あり", client.base_url()),
                    Err(e) => println!("  API ({}): ✘ {}", client.base_url(), e),
                },
                Err(e) => println!("  API: ✘ {}", e),
            }
        }
    }

    Ok(())
}

async fn submit(
    config: &Config,
    store: PersistentStore,
    session: &mut ReviewSession,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = Arc::new(HttpCollaborator::from_config(config)?);
    let mut coordinator = ExportCoordinator::new(store, client);

    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));

    let spinner = spinner("集計してCSVを生成中...".to_string());
    let result = coordinator.submit(session, &output_dir).await;
    spinner.finish_and_clear();

    let submitted = result.context("提出に失敗しました（入力内容は保存されています）")?;

    println!("✔ CSV出力: {}", submitted.path.display());
    println!("\n✅ 提出完了");
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_schema(schema: &cleanup_ocr_common::FormSchema) {
    println!("カテゴリ定義:");
    for category in &schema.categories {
        let fields: Vec<_> = category.fields.iter().map(|f| f.name()).collect();
        println!("  {}: {}", category.name, fields.join(", "));
    }
    if let Some(updated_at) = &schema.updated_at {
        println!("  (更新: {})", updated_at);
    }
}

fn warn_if_not_persistent(store: &PersistentStore) {
    if !store.is_available() {
        println!("⚠ ローカル保存が使えないため、この内容は次回起動時に残りません");
    }
}
