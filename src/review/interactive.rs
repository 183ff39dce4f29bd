//! 対話式レビュー
//!
//! 1画像ずつフィールド一覧を表示し、値の修正・確認・移動を受け付ける。
//! 移動と終了の前には必ず `ReviewSession::commit` を通して保存する。

use super::{ReviewSession, ReviewSnapshot};
use crate::error::{CleanupError, Result};
use dialoguer::Input;

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// 次の画像へ
    Next,
    /// 前の画像へ
    Prev,
    /// 行の値を修正（行番号は0始まり）
    Edit { row: usize, value: String },
    /// 行を確認済みにする
    Focus(usize),
    /// 保存して提出へ進む
    Submit,
    /// 保存して終了
    Quit,
}

/// レビュー終了時の行き先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewExit {
    Quit,
    Submit,
}

/// 入力行をアクションに変換（行番号は表示どおり1始まりで受け取る）
pub fn parse_review_command(input: &str) -> Option<ReviewAction> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or("");

    match command {
        "" | "n" => Some(ReviewAction::Next),
        "p" => Some(ReviewAction::Prev),
        "s" | "submit" => Some(ReviewAction::Submit),
        "q" | "Q" => Some(ReviewAction::Quit),
        "f" => parse_row(parts.next()?).map(ReviewAction::Focus),
        "e" => {
            let row = parse_row(parts.next()?)?;
            let value = parts.collect::<Vec<_>>().join(" ");
            Some(ReviewAction::Edit { row, value })
        }
        _ => None,
    }
}

fn parse_row(token: &str) -> Option<usize> {
    token.parse::<usize>().ok()?.checked_sub(1)
}

/// 画面表示
pub fn render(snapshot: &ReviewSnapshot) {
    let Some(uuid) = &snapshot.uuid else {
        println!("レビュー対象の画像がありません");
        return;
    };

    println!(
        "\n[{}/{}] {} (要確認 {}件)",
        snapshot.current_index + 1,
        snapshot.image_count,
        uuid,
        snapshot.issue_count
    );
    for (i, row) in snapshot.rows.iter().enumerate() {
        let mark = if row.field.status.is_flagged() { "⚠" } else { " " };
        println!(
            "  {} {:>2}. {} / {} = {}  [{}]",
            mark,
            i + 1,
            row.category,
            row.field.name,
            row.field.value,
            row.field.status
        );
    }
}

/// 対話式レビューを実行
pub async fn run_interactive_review(session: &mut ReviewSession) -> Result<ReviewExit> {
    if session.image_count() == 0 {
        println!("レビュー対象の画像がありません。先に upload を実行してください");
        return Ok(ReviewExit::Quit);
    }

    println!("操作: [Enter/n]次 [p]前 [e 行 値]修正 [f 行]確認 [s]提出 [q]終了");

    loop {
        render(&session.snapshot());

        let input = prompt_command()?;
        let Some(action) = parse_review_command(&input) else {
            println!("  → 不明なコマンドです: {}", input.trim());
            continue;
        };

        match action {
            ReviewAction::Next => session.go_to(1).await?,
            ReviewAction::Prev => session.go_to(-1).await?,
            ReviewAction::Edit { row, value } => {
                // 修正する行は開いた扱い
                let edited = match session.on_field_focused(row) {
                    Ok(()) => session.set_field_value(row, &value),
                    Err(e) => Err(e),
                };
                if let Err(e) = edited {
                    println!("  → {}", e);
                }
            }
            ReviewAction::Focus(row) => {
                if let Err(e) = session.on_field_focused(row) {
                    println!("  → {}", e);
                }
            }
            ReviewAction::Submit => {
                session.commit().await?;
                return Ok(ReviewExit::Submit);
            }
            ReviewAction::Quit => {
                session.commit().await?;
                println!("保存して終了します");
                return Ok(ReviewExit::Quit);
            }
        }
    }
}

fn prompt_command() -> Result<String> {
    Input::new()
        .with_prompt("コマンド")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CleanupError::CliExecution(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_review_command(""), Some(ReviewAction::Next));
        assert_eq!(parse_review_command("n"), Some(ReviewAction::Next));
        assert_eq!(parse_review_command(" p "), Some(ReviewAction::Prev));
        assert_eq!(parse_review_command("q"), Some(ReviewAction::Quit));
        assert_eq!(parse_review_command("submit"), Some(ReviewAction::Submit));
    }

    #[test]
    fn test_parse_edit_uses_one_based_rows() {
        assert_eq!(
            parse_review_command("e 2 15"),
            Some(ReviewAction::Edit { row: 1, value: "15".into() })
        );
        assert_eq!(parse_review_command("f 1"), Some(ReviewAction::Focus(0)));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_review_command("e 0 3"), None);
        assert_eq!(parse_review_command("f"), None);
        assert_eq!(parse_review_command("x"), None);
    }

    /// 値を省略した修正は空文字（=0）として扱う
    #[test]
    fn test_parse_edit_without_value() {
        assert_eq!(
            parse_review_command("e 3"),
            Some(ReviewAction::Edit { row: 2, value: String::new() })
        );
    }
}
