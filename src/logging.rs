use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ログ出力を初期化（標準エラー出力、`RUST_LOG` があれば優先）
///
/// 標準出力はコマンドの結果表示に使うので混ぜない。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cleanup_ocr_rust={}", default_level)));

    // テストなどで二重に初期化されても無視する
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
