//! 会话持久化
//!
//! 页面刷新后恢复登录状态。

use super::Session;
use crate::web::LocalStorage;

const STORAGE_SESSION_KEY: &str = "codesage_session";

pub trait SessionStore {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// 基于 LocalStorage 的会话存储
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessionStore;

impl SessionStore for BrowserSessionStore {
    fn load(&self) -> Option<Session> {
        LocalStorage::get_json(STORAGE_SESSION_KEY)
    }

    fn save(&self, session: &Session) {
        if !LocalStorage::set_json(STORAGE_SESSION_KEY, session) {
            log::warn!("[identity] session could not be persisted");
        }
    }

    fn clear(&self) {
        LocalStorage::delete(STORAGE_SESSION_KEY);
    }
}

/// 写入当前会话；`None` 清除
pub fn persist(store: &impl SessionStore, session: Option<&Session>) {
    match session {
        Some(session) => store.save(session),
        None => store.clear(),
    }
}
