/*
 * Responsibility
 * - middleware の公開インターフェース
 * - pub fn apply(...) を各モジュールに置く (app.rs からは apply を呼ぶだけ)
 */
pub mod cors;
pub mod http;
pub mod security_headers;
