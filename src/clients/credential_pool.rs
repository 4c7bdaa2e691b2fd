//! 密钥池
//!
//! 保存去重后的 API 密钥列表和当前使用的位置。

use chrono::Datelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 初始密钥的选择策略
///
/// 多个进程共用同一组密钥时，不总是从第一个开始可以分散负载。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySelection {
    /// 总是从第一个密钥开始
    First,
    /// 按当月日期轮换：两个密钥时奇数日用第一个、偶数日用第二个
    #[default]
    DayParity,
    /// 随机选择
    Random,
}

impl KeySelection {
    /// 选择初始位置，`pool_size` 必须大于 0
    pub fn pick(&self, pool_size: usize) -> usize {
        if pool_size <= 1 {
            return 0;
        }
        match self {
            KeySelection::First => 0,
            KeySelection::DayParity => Self::pick_for_day(chrono::Local::now().day(), pool_size),
            KeySelection::Random => rand::rng().random_range(0..pool_size),
        }
    }

    fn pick_for_day(day: u32, pool_size: usize) -> usize {
        (day.saturating_sub(1) as usize) % pool_size
    }
}

/// 密钥在池中的位置
///
/// `epoch` 在整体替换密钥池时递增，旧池中观察到的位置不会影响新池。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySlot {
    pub epoch: u64,
    pub index: usize,
}

/// 密钥池
#[derive(Debug, Clone)]
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: usize,
    epoch: u64,
}

impl CredentialPool {
    /// 创建密钥池：去掉空值和重复值，保留原有顺序
    pub fn new<I, S>(keys: I, selection: KeySelection) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !key.is_empty() && !unique.contains(&key) {
                unique.push(key);
            }
        }
        let cursor = if unique.is_empty() {
            0
        } else {
            selection.pick(unique.len())
        };
        Self {
            keys: unique,
            cursor,
            epoch: 0,
        }
    }

    /// 整体替换密钥，重新选择初始位置
    pub fn replace<I, S>(&mut self, keys: I, selection: KeySelection)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fresh = Self::new(keys, selection);
        self.keys = fresh.keys;
        self.cursor = fresh.cursor;
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// 当前位置和密钥
    pub fn current(&self) -> Option<(KeySlot, &str)> {
        let slot = KeySlot {
            epoch: self.epoch,
            index: self.cursor,
        };
        self.keys.get(self.cursor).map(|key| (slot, key.as_str()))
    }

    /// 从 `observed` 位置切换到下一个密钥
    ///
    /// 只有密钥池没被替换、且当前位置仍是 `observed` 时才前进，
    /// 并发调用同时遇到限流时不会跳过密钥。返回切换后的位置。
    pub fn advance_from(&mut self, observed: KeySlot) -> usize {
        if !self.keys.is_empty() && self.epoch == observed.epoch && self.cursor == observed.index {
            self.cursor = (self.cursor + 1) % self.keys.len();
        }
        self.cursor
    }
}
