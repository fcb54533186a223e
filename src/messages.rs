//! User-facing status and alert text.

pub const SIGN_UP_SUCCEEDED: &str = "登録成功！ログインしてください。";
pub const SIGN_IN_SUCCEEDED: &str = "ログイン成功！ページ移動までお待ちください…";
pub const SIGNED_OUT: &str = "ログアウトしました";
pub const PROMPT_SIGN_IN: &str = "ログインして下さい";
pub const SIGN_IN_REQUIRED: &str = "ログインしてください";
pub const EMPTY_CONTENT: &str = "投稿内容を入力してください";
pub const POST_SUCCEEDED: &str = "投稿成功！";
pub const REACTION_FAILED: &str = "リアクション失敗";
pub const EMAIL_REQUIRED: &str = "メールアドレスを入力してください";
pub const RESET_EMAIL_SENT: &str = "パスワードリセット用のメールを送信しました";

/// Placeholder rendered into an empty posts container.
pub const NO_POSTS: &str = "投稿はまだありません。";

#[must_use]
pub fn error(message: &str) -> String {
    format!("エラー: {message}")
}

#[must_use]
pub fn sign_in_error(message: &str) -> String {
    format!("ログインエラー: {message}")
}

#[must_use]
pub fn post_error(message: &str) -> String {
    format!("投稿エラー: {message}")
}

#[must_use]
pub fn signed_in_as(email: &str) -> String {
    format!("ログイン中: {email}")
}
