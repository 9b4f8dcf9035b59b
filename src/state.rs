/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gate: DecisionPipeline (allowlist はプロセス内で一度だけ初期化)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::gate::DecisionPipeline;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<DecisionPipeline>,
}

impl AppState {
    pub fn new(gate: Arc<DecisionPipeline>) -> Self {
        Self { gate }
    }
}
