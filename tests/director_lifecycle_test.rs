// ==========================================
// 阶段主任生命周期 集成测试
// ==========================================
// 测试范围:
// 1. 新建: 角色授予、位置、重复拒绝
// 2. 删除: 位置 → 分配 → 主任记录级联
// 3. 列表与历史
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use iglesia_grupos::api::{ApiError, CreateDirectorRequest, SyncRequest};

fn create_request(person_id: &str, location_id: Option<&str>) -> CreateDirectorRequest {
    CreateDirectorRequest {
        person_id: person_id.to_string(),
        location_id: location_id.map(str::to_string),
    }
}

#[test]
fn test_create_assign_delete_flow() {
    let env = ApiTestEnv::with_standard_scenario();
    env.data.person("PN", Some("Nora"), Some("Vidal"), None);

    let director = env
        .director_api
        .create_director(&superior(), "S", &create_request("PN", Some("LOC-1")))
        .expect("创建失败");
    assert_eq!(director.segment_id, "S");
    assert!(director.is_director_etapa());

    // 新主任可立即被分配并以受限身份查看
    env.assignment_api
        .synchronize(&superior(), "S", &director.id, &SyncRequest::merge(&["G3", "G4"], &[]))
        .expect("分配失败");
    let caller = env.state.resolve_caller("PN").expect("解析调用方失败");
    assert!(!caller.is_superior());
    let listing = env
        .assignment_api
        .list_assignable_groups(&caller, "S", &director.id)
        .expect("查询失败");
    assert_eq!(listing.total, 2);

    let removal = env
        .director_api
        .delete_director(&superior(), "S", &director.id)
        .expect("删除失败");
    assert_eq!(removal.locations_removed, 1);
    assert_eq!(removal.assignments_removed, 2);
    assert!(env.assigned(&director.id).is_empty());

    // 其他主任不受影响
    assert_eq!(env.assigned("D"), set(&["G1", "G2"]));
}

#[test]
fn test_create_rejects_duplicates_and_unknown_refs() {
    let env = ApiTestEnv::with_standard_scenario();

    let err = env
        .director_api
        .create_director(&superior(), "S", &create_request("PD", None))
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedRequest(_)), "同一人员同一分区只能有一条记录");

    // 不同分区允许
    env.director_api
        .create_director(&superior(), "S2", &create_request("PD", None))
        .expect("跨分区创建失败");

    let err = env
        .director_api
        .create_director(&superior(), "S", &create_request("NOPE", None))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = env
        .director_api
        .create_director(&superior(), "S9", &create_request("PD", None))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_create_from_json_body() {
    let env = ApiTestEnv::with_standard_scenario();
    env.data.person("PN", Some("Nora"), None, None);

    let err = env
        .director_api
        .create_director_json(&superior(), "S", br#"{ "personId": ["PN"] }"#)
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedRequest(_)));

    let director = env
        .director_api
        .create_director_json(&superior(), "S", br#"{ "personId": "PN" }"#)
        .expect("创建失败");
    assert_eq!(director.person_id, "PN");
}

#[test]
fn test_list_directors_by_tier() {
    let env = ApiTestEnv::with_standard_scenario();
    env.data
        .person("PE", Some("Elena"), None, None)
        .director("E", "S", "PE")
        .assign("E", &["G3"]);

    let all = env
        .director_api
        .list_directors(&superior(), "S")
        .expect("查询失败");
    assert_eq!(all.len(), 2);
    let d = all.iter().find(|s| s.id == "D").expect("缺少主任 D");
    assert_eq!(d.display_name, "Diana Reyes");
    assert_eq!(d.assigned_groups, 2);

    let own = env
        .director_api
        .list_directors(&scoped("PE"), "S")
        .expect("查询失败");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, "E");

    let err = env
        .director_api
        .list_directors(&scoped("PE"), "S2")
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied(_)));
}

#[test]
fn test_history_newest_first_and_superior_only() {
    let env = ApiTestEnv::with_standard_scenario();

    for add in ["G3", "G4"] {
        env.assignment_api
            .synchronize(&superior(), "S", "D", &SyncRequest::merge(&[add], &[]))
            .expect("同步失败");
    }

    let history = env
        .director_api
        .list_history(&superior(), "S", "D", None)
        .expect("查询失败");
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[0].payload_json.as_ref().unwrap()["agregados"],
        serde_json::json!(["G4"])
    );

    let limited = env
        .director_api
        .list_history(&superior(), "S", "D", Some(1))
        .expect("查询失败");
    assert_eq!(limited.len(), 1);

    let err = env
        .director_api
        .list_history(&scoped("PD"), "S", "D", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied(_)));
}
