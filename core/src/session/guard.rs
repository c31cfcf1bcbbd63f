//! 在途命令标记：同一时刻只允许一个会话命令执行

use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    /// 标记已被占用时返回 None，调用方应以 Busy 拒绝
    pub(crate) fn try_begin(&self, command: &'static str) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(InFlightGuard {
            flag: &self.busy,
            command,
            request_id: Uuid::new_v4(),
        })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 释放时清除在途标记
pub(crate) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    command: &'static str,
    request_id: Uuid,
}

impl InFlightGuard<'_> {
    pub(crate) fn command(&self) -> &'static str {
        self.command
    }

    pub(crate) fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
