use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::core::config::MonitorConfig;
use crate::core::types::{MonitorSnapshot, Notification, TransactionRecord};

/// 运行期可调的监控开关
#[derive(Debug, Clone)]
struct Settings {
    threshold: f64,
    active: bool,
}

/// 互斥锁内的全部可变状态
///
/// 缓冲区与开关放在同一把锁下，阈值读取始终与其过滤的缓冲内容一致。
#[derive(Debug)]
struct Inner {
    transactions: VecDeque<TransactionRecord>,
    notifications: VecDeque<Notification>,
    settings: Settings,
}

/// 共享监控状态
///
/// 进程启动时构造一次，经 Arc 注入监听任务与轮询桥两侧。
/// 所有读写都经过内部互斥锁，临界区只做追加/截断/拷贝。
pub struct MonitorState {
    inner: Mutex<Inner>,
    tx_capacity: usize,
    notification_capacity: usize,
    notification_ttl: Duration,
}

impl MonitorState {
    pub fn new(config: &MonitorConfig) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                transactions: VecDeque::with_capacity(config.tx_capacity),
                notifications: VecDeque::with_capacity(config.notification_capacity),
                settings: Settings {
                    threshold: config.threshold,
                    active: true,
                },
            }),
            tx_capacity: config.tx_capacity,
            notification_capacity: config.notification_capacity,
            notification_ttl: Duration::seconds(config.notification_ttl_secs as i64),
        })
    }

    /// 追加一条交易记录，超出容量时淘汰最旧的
    pub fn append_transaction(&self, record: TransactionRecord) {
        let mut guard = self.inner.lock();
        guard.transactions.push_back(record);
        while guard.transactions.len() > self.tx_capacity {
            guard.transactions.pop_front();
        }
    }

    /// 追加一条告警，容量独立于过期策略
    pub fn append_notification(&self, note: Notification) {
        let mut guard = self.inner.lock();
        guard.notifications.push_back(note);
        while guard.notifications.len() > self.notification_capacity {
            guard.notifications.pop_front();
        }
    }

    /// 取两个缓冲区的独立拷贝，调用方读取时无需再持锁
    pub fn snapshot(&self) -> MonitorSnapshot {
        let guard = self.inner.lock();
        MonitorSnapshot {
            transactions: guard.transactions.iter().cloned().collect(),
            notifications: guard.notifications.iter().cloned().collect(),
        }
    }

    /// 清理超过存活时间的告警，原地重写缓冲区
    ///
    /// 时间未推进、无新告警时重复调用结果不变。
    pub fn prune_expired_notifications(&self, now: DateTime<Utc>) {
        let ttl = self.notification_ttl;
        let mut guard = self.inner.lock();
        guard
            .notifications
            .retain(|note| now.signed_duration_since(note.created_at) < ttl);
    }

    pub fn threshold(&self) -> f64 {
        self.inner.lock().settings.threshold
    }

    pub fn set_threshold(&self, threshold: f64) {
        self.inner.lock().settings.threshold = threshold;
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().settings.active
    }

    pub fn set_active(&self, active: bool) {
        self.inner.lock().settings.active = active;
    }
}
