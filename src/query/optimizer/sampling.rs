//! 采样工具
//!
//! - 蓄水池采样：在不知道总量的情况下均匀采样固定数量的元素
//! - 基于下标的采样：在已知规模的展平集合上无放回地均匀抽取下标
//!
//! 随机数生成器由调用方传入，估算器据此实现可复现的采样。

use rand::Rng;

/// 蓄水池采样结构体
#[derive(Debug, Clone)]
pub struct ReservoirSampling<T> {
    /// 采样容量
    capacity: usize,
    /// 已处理的元素数量
    count: usize,
    /// 当前样本
    samples: Vec<T>,
}

impl<T> ReservoirSampling<T> {
    /// 创建新的蓄水池采样器
    ///
    /// # 参数
    /// - `capacity`: 采样容量，即要保留的样本数量
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            count: 0,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// 处理一个元素
    ///
    /// # 返回
    /// 如果元素被采样返回true，否则返回false
    pub fn sample<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) -> bool {
        self.count += 1;

        if self.samples.len() < self.capacity {
            // 蓄水池未满，直接添加
            self.samples.push(item);
            true
        } else {
            // 蓄水池已满，以 capacity/count 的概率替换
            let j = rng.gen_range(0..self.count);
            if j < self.capacity {
                self.samples[j] = item;
                true
            } else {
                false
            }
        }
    }

    /// 批量处理元素，返回被采样的元素数量
    pub fn sample_iter<I, R>(&mut self, items: I, rng: &mut R) -> usize
    where
        I: IntoIterator<Item = T>,
        R: Rng + ?Sized,
    {
        let mut sampled = 0;
        for item in items {
            if self.sample(item, rng) {
                sampled += 1;
            }
        }
        sampled
    }

    /// 获取当前样本
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// 获取当前样本（消耗自身）
    pub fn into_samples(self) -> Vec<T> {
        self.samples
    }

    /// 获取已处理的元素数量
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 检查蓄水池是否已满
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// 欠采样修正因子：已处理元素数 / 样本数
    ///
    /// 未发生截断时为 1.0
    pub fn under_sampling_factor(&self) -> f64 {
        if self.samples.is_empty() {
            1.0
        } else {
            self.count as f64 / self.samples.len() as f64
        }
    }
}

/// 从 `[0, population)` 中无放回均匀抽取 `amount` 个下标，结果升序
///
/// `amount >= population` 时返回全部下标。
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, population: usize, amount: usize) -> Vec<usize> {
    if amount >= population {
        return (0..population).collect();
    }

    let mut indices = rand::seq::index::sample(rng, population, amount).into_vec();
    indices.sort_unstable();
    indices
}
