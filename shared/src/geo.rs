//! 地理坐标模块
//!
//! 提供 [`GeoPoint`] 坐标类型及其文本解析。
//! 地图选点与地点自动补全属于外部协作方，前端表单只接受
//! `"纬度, 经度"` 形式的文本输入，在本模块完成解析与范围校验。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 一个 WGS84 坐标点
///
/// 字段名与后端 API 的 `pickup_location` / `dropoff_location`
/// 以及途经点数组元素完全一致。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// 默认地图中心（旧金山）
pub const SAN_FRANCISCO: GeoPoint = GeoPoint::new(37.7749, -122.4194);

impl GeoPoint {
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 坐标是否落在合法范围内
    ///
    /// 纬度 [-90, 90]，经度 [-180, 180]，且两者均为有限数。
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// 从 `"纬度, 经度"` 文本解析
    ///
    /// 返回 None 如果格式不对或数值越界。
    /// 空白会被容忍：`"37.7749,-122.4194"` 与 `" 37.7749 , -122.4194 "` 等价。
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(',');
        let lat = parts.next()?.trim().parse::<f64>().ok()?;
        let lng = parts.next()?.trim().parse::<f64>().ok()?;
        // 超过两段说明格式不对
        if parts.next().is_some() {
            return None;
        }
        let point = GeoPoint::new(lat, lng);
        point.is_valid().then_some(point)
    }
}

impl fmt::Display for GeoPoint {
    /// 与 [`GeoPoint::parse`] 互逆的 `"纬度, 经度"` 文本形式
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}
