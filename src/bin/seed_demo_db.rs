// ==========================================
// 教会社区管理 - 演示数据库重置与种子数据
// ==========================================
// 用法: seed_demo_db [db_path]
// 已存在的数据库先备份为 <db_path>.bak.<时间戳> 再重建
// ==========================================

use anyhow::Context;
use chrono::Local;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use iglesia_grupos::config::get_default_db_path;
use iglesia_grupos::db::{init_schema, open_sqlite_connection};
use iglesia_grupos::domain::{Director, Group, MembershipRole, Person, RoleTag};
use iglesia_grupos::repository::{
    AssignmentRepository, DirectorRepository, GroupRepository, PersonRepository,
    SegmentRepository,
};

const SEGMENTS: [(&str, &str); 2] = [("SEG-JOV", "Jóvenes"), ("SEG-PAR", "Parejas")];
const SEASON_ID: &str = "T-2026-1";
const GROUPS_PER_SEGMENT: usize = 6;
const MEMBERS_PER_GROUP: usize = 8;

fn main() -> anyhow::Result<()> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库 {}", db_path))?;
    init_schema(&conn)?;
    conn.execute(
        "INSERT INTO seasons (id, name) VALUES (?1, ?2)",
        [SEASON_ID, "Temporada 2026-1"],
    )?;
    let conn = Arc::new(Mutex::new(conn));

    let segment_repo = SegmentRepository::new(conn.clone());
    let person_repo = PersonRepository::new(conn.clone());
    let group_repo = GroupRepository::new(conn.clone());
    let director_repo = DirectorRepository::new(conn.clone());
    let assignment_repo = AssignmentRepository::new(conn);

    // 上级角色
    seed_person(&person_repo, "P-PASTOR", "Samuel", "Ortiz")?;
    person_repo.grant_role("P-PASTOR", RoleTag::Pastor.to_db_str())?;

    let mut person_seq = 0usize;
    for (segment_id, segment_name) in SEGMENTS {
        segment_repo.insert(segment_id, segment_name)?;

        let mut group_ids = Vec::new();
        for g in 0..GROUPS_PER_SEGMENT {
            let group = Group {
                id: format!("{}-G{}", segment_id, g + 1),
                name: format!("{} {}", segment_name, g + 1),
                segment_id: segment_id.to_string(),
                season_id: Some(SEASON_ID.to_string()),
                season_name: None,
                active: g % 5 != 4,
                deleted: false,
            };
            group_repo.insert(&group)?;

            for m in 0..MEMBERS_PER_GROUP {
                person_seq += 1;
                let person_id = format!("P{:04}", person_seq);
                seed_person(&person_repo, &person_id, &format!("Persona{}", person_seq), "Demo")?;
                let role = match m {
                    0 => MembershipRole::Lider,
                    1 => MembershipRole::Colider,
                    _ => MembershipRole::Miembro,
                };
                // 最后一名成员已退出
                let exit_date = (m == MEMBERS_PER_GROUP - 1).then_some("2026-01-31");
                group_repo.add_member(&group.id, &person_id, role.to_db_str(), exit_date)?;
            }
            group_ids.push(group.id);
        }

        // 每个分区两名阶段主任，各负责一半小组
        for (d, half) in group_ids.chunks(GROUPS_PER_SEGMENT / 2).enumerate() {
            let person_id = format!("P-DIR-{}-{}", segment_id, d + 1);
            seed_person(&person_repo, &person_id, &format!("Director{}", d + 1), segment_name)?;

            let director = Director::new(segment_id.to_string(), person_id);
            director_repo.create(
                &director,
                RoleTag::DirectorEtapa.to_db_str(),
                Some(&format!("LOC-{}", d + 1)),
            )?;

            let to_add: BTreeSet<String> = half.iter().cloned().collect();
            assignment_repo.apply_changes(&director.id, &BTreeSet::new(), &to_add)?;
            eprintln!("主任 {} → {} 个小组", director.id, to_add.len());
        }
    }

    eprintln!("种子数据已写入 {}", db_path);
    Ok(())
}

fn seed_person(
    repo: &PersonRepository,
    id: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<()> {
    repo.insert(&Person {
        id: id.to_string(),
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        email: Some(format!("{}@iglesia.local", id.to_lowercase())),
    })?;
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
