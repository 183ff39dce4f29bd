use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cleanup-ocr")]
#[command(about = "清掃活動記録カードのOCR結果レビュー・集計ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 新しい提出を開始（活動情報を入力）
    New {
        /// 活動情報 (key=value、複数指定可)
        #[arg(short, long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// 画像フォルダをアップロードしてOCR結果を取り込む
    Upload {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 提出が未作成の場合に使う活動情報 (key=value)
        #[arg(short, long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// 進行中の提出の状況を表示
    Status,

    /// 画像ごとにOCR結果を確認・修正
    Review {
        /// 開始する画像番号（1始まり）
        #[arg(short, long)]
        start: Option<usize>,

        /// レビュー後に提出する場合のCSV出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 全画像を集計してCSVを生成
    Submit {
        /// CSV出力先ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 進行中の提出を破棄
    Reset {
        /// 確認せずに破棄
        #[arg(short, long)]
        yes: bool,
    },

    /// カテゴリ定義の表示/更新
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },

    /// 設定を表示/編集
    Config {
        /// APIのURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// ローカル保存の有効/無効
        #[arg(long)]
        storage: Option<bool>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 設定・ローカル保存・API疎通を確認
    Doctor,
}

#[derive(Subcommand)]
pub enum SchemaAction {
    /// 現在のカテゴリ定義を表示
    Show {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// JSONファイルでカテゴリ定義を更新
    Set {
        /// カテゴリ定義JSONファイル
        #[arg(required = true)]
        file: PathBuf,
    },
}
