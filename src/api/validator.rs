// ==========================================
// 教会社区管理 - 请求校验器
// ==========================================
// 职责: 边界处的严格解析 + 主任引用解析
// 约束: 非法输入一律 MalformedRequest，不做静默过滤
// ==========================================

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::director::Director;
use crate::domain::types::SyncMode;
use crate::engine::permission::Caller;
use crate::repository::director_repo::DirectorRepository;
use crate::repository::segment_repo::SegmentRepository;

// ==========================================
// 同步请求体
// ==========================================

/// 解析后的同步请求
///
/// `agregar` / `quitar` 已去除首尾空白并去重
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub mode: SyncMode,
    pub agregar: BTreeSet<String>,
    pub quitar: BTreeSet<String>,
}

impl SyncRequest {
    pub fn merge(agregar: &[&str], quitar: &[&str]) -> Self {
        Self {
            mode: SyncMode::Merge,
            agregar: agregar.iter().map(|s| s.to_string()).collect(),
            quitar: quitar.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn replace(target: &[&str]) -> Self {
        Self {
            mode: SyncMode::Replace,
            agregar: target.iter().map(|s| s.to_string()).collect(),
            quitar: BTreeSet::new(),
        }
    }
}

/// 解析 `{ agregar, quitar, modo }`
///
/// - `modo` 缺省为 merge
/// - `quitar` 缺省为空；replace 模式下仍校验类型，但不参与计算
/// - replace 模式必须显式给出 `agregar`
pub fn parse_sync_request(body: &[u8]) -> ApiResult<SyncRequest> {
    let obj = parse_object(body)?;

    let mode = match obj.get("modo") {
        None | Some(Value::Null) => SyncMode::Merge,
        // 严格匹配，不做大小写/空白归一
        Some(Value::String(s)) => match s.as_str() {
            "merge" => SyncMode::Merge,
            "replace" => SyncMode::Replace,
            _ => return Err(ApiError::malformed("invalid_mode", &[("value", s)])),
        },
        Some(other) => {
            return Err(ApiError::malformed(
                "invalid_mode",
                &[("value", &other.to_string())],
            ))
        }
    };

    let agregar = match id_list(&obj, "agregar")? {
        Some(ids) => ids,
        None if mode == SyncMode::Replace => {
            return Err(ApiError::malformed("missing_field", &[("field", "agregar")]))
        }
        None => BTreeSet::new(),
    };
    let quitar = id_list(&obj, "quitar")?.unwrap_or_default();

    Ok(SyncRequest {
        mode,
        agregar,
        quitar,
    })
}

// ==========================================
// 新建主任请求体
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDirectorRequest {
    pub person_id: String,
    pub location_id: Option<String>,
}

/// 解析 `{ personId, locationId? }`
pub fn parse_create_director_request(body: &[u8]) -> ApiResult<CreateDirectorRequest> {
    let obj = parse_object(body)?;

    let person_id = match optional_string(&obj, "personId")? {
        Some(id) => id,
        None => return Err(ApiError::missing_id("personId")),
    };
    let location_id = optional_string(&obj, "locationId")?;

    Ok(CreateDirectorRequest {
        person_id,
        location_id,
    })
}

/// 路径/参数中的ID不能为空
pub fn require_id<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::missing_id(field));
    }
    Ok(trimmed)
}

fn parse_object(body: &[u8]) -> ApiResult<Map<String, Value>> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::malformed("invalid_json", &[]))?;
    match value {
        Value::Object(obj) => Ok(obj),
        _ => Err(ApiError::malformed("not_object", &[])),
    }
}

fn id_list(obj: &Map<String, Value>, field: &str) -> ApiResult<Option<BTreeSet<String>>> {
    let items = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::malformed("not_array", &[("field", field)])),
    };

    let mut ids = BTreeSet::new();
    for item in items {
        let s = item
            .as_str()
            .ok_or_else(|| ApiError::malformed("not_string", &[("field", field)]))?;
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ApiError::malformed("blank_element", &[("field", field)]));
        }
        ids.insert(trimmed.to_string());
    }
    Ok(Some(ids))
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> ApiResult<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ApiError::missing_id(field)),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(ApiError::malformed("not_string", &[("field", field)])),
    }
}

// ==========================================
// DirectorGuard - 权限与主任引用前置校验
// ==========================================

/// 按固定顺序校验，首个失败即返回，不产生任何写入
pub struct DirectorGuard {
    segment_repo: Arc<SegmentRepository>,
    director_repo: Arc<DirectorRepository>,
}

impl DirectorGuard {
    pub fn new(
        segment_repo: Arc<SegmentRepository>,
        director_repo: Arc<DirectorRepository>,
    ) -> Self {
        Self {
            segment_repo,
            director_repo,
        }
    }

    /// 写操作要求上级角色
    pub fn require_superior(&self, caller: &Caller) -> ApiResult<()> {
        if caller.is_superior() {
            Ok(())
        } else {
            Err(ApiError::permission_denied())
        }
    }

    /// 分区必须存在
    pub fn require_segment(&self, segment_id: &str) -> ApiResult<()> {
        let segment_id = require_id("segmentId", segment_id)?;
        if !self.segment_repo.exists(segment_id)? {
            return Err(ApiError::not_found("segment", segment_id));
        }
        Ok(())
    }

    /// 解析主任：分区存在 → 主任存在 → 角色为 director_etapa → 属于该分区
    pub fn resolve(&self, segment_id: &str, director_id: &str) -> ApiResult<Director> {
        self.require_segment(segment_id)?;
        let segment_id = segment_id.trim();
        let director_id = require_id("directorId", director_id)?;

        let director = self
            .director_repo
            .find_by_id(director_id)?
            .ok_or_else(|| ApiError::not_found("director", director_id))?;

        if !director.is_director_etapa() {
            return Err(ApiError::invalid_role(director_id));
        }
        if director.segment_id != segment_id {
            return Err(ApiError::segment_mismatch(director_id, segment_id));
        }
        Ok(director)
    }
}
