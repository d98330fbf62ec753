//! End-to-end versioned save workflow on a real directory.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use versave_core::{
    BlockReason, FileSession, Session, Versave, VersaveConfig, VersaveError, discovery,
    grammar::ProjectName, host::StdFileSystem,
};

fn versions(dir: &Path) -> Vec<u64> {
    discovery::list(&StdFileSystem, dir, &ProjectName::new("scene"))
        .unwrap()
        .versions()
}

#[test]
fn test_new_project_through_three_versions() {
    let dir = tempdir().unwrap();
    let mut session = FileSession::new().with_backup_count(1);
    session.set_contents(b"cube".to_vec());
    let mut versave = Versave::with_std_fs(session, VersaveConfig::default());

    let first = versave
        .save_next(Some(&dir.path().join("scene.blend")))
        .unwrap();
    let project_dir = dir.path().join("scene");
    assert!(first.outcome.bootstrapped);
    assert_eq!(first.outcome.path, project_dir.join("scene_v1.blend"));

    versave.session_mut().set_contents(b"cube + light".to_vec());
    let second = versave.save_next(None).unwrap();
    assert_eq!(second.outcome.path, project_dir.join("scene_v2.blend"));
    assert_eq!(fs::read(project_dir.join("scene_v1.blend")).unwrap(), b"cube");
    assert_eq!(versions(&project_dir), vec![1, 2]);

    // Saving in place leaves a host backup that gets rotated away.
    versave.session_mut().set_contents(b"cube + light + camera".to_vec());
    let in_place = versave.save(None).unwrap();
    assert_eq!(in_place.outcome.path, project_dir.join("scene_v2.blend"));
    assert_eq!(in_place.rotation.unwrap().moved_count(), 1);
    assert!(project_dir.join("backup/scene_v2.blend1").is_file());
    assert_eq!(versions(&project_dir), vec![1, 2]);

    let third = versave.save_next(None).unwrap();
    assert_eq!(third.outcome.path, project_dir.join("scene_v3.blend"));
    assert_eq!(versions(&project_dir), vec![1, 2, 3]);

    let backups = versave.list_backups().unwrap();
    assert!(backups.is_empty(), "backups are per version file");
}

#[test]
fn test_switch_back_and_refuse_to_clobber_history() {
    let dir = tempdir().unwrap();
    for (name, body) in [("scene_v1.blend", "one"), ("scene_v2.blend", "two")] {
        fs::write(dir.path().join(name), body).unwrap();
    }
    let session = FileSession::open(&dir.path().join("scene_v2.blend")).unwrap();
    let mut versave = Versave::with_std_fs(session, VersaveConfig::default());

    versave.session_mut().mark_dirty();
    let blocked = versave.open(&dir.path().join("scene_v1.blend")).unwrap_err();
    assert!(matches!(
        blocked,
        VersaveError::Blocked(BlockReason::UnsavedChanges)
    ));
    assert!(blocked.needs_user_action());

    // Back to a clean session on v2, then open v1.
    let session = FileSession::open(&dir.path().join("scene_v2.blend")).unwrap();
    let mut versave = Versave::with_std_fs(session, VersaveConfig::default());
    versave.open(&dir.path().join("scene_v1.blend")).unwrap();
    assert_eq!(versave.session().contents(), b"one");

    // v2 already exists, so saving forward from v1 must not overwrite it.
    let err = versave.save_next(None).unwrap_err();
    assert!(matches!(err, VersaveError::VersionExists { .. }));
    assert_eq!(fs::read(dir.path().join("scene_v2.blend")).unwrap(), b"two");
    assert_eq!(
        versave.session().current_file_path(),
        Some(dir.path().join("scene_v1.blend"))
    );
}

#[test]
fn test_unversioned_file_starts_history() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("scene.blend"), b"legacy").unwrap();

    let session = FileSession::open(&dir.path().join("scene.blend")).unwrap();
    let mut versave = Versave::with_std_fs(session, VersaveConfig::default());
    let report = versave.save_next(None).unwrap();

    assert_eq!(report.outcome.path, dir.path().join("scene_v2.blend"));
    assert!(dir.path().join("scene.blend").is_file());

    let set = versave.list_current_versions().unwrap().unwrap();
    assert_eq!(set.versions(), vec![1, 2]);
    assert!(set.entries()[0].implicit);
    assert_eq!(set.file_names(), vec!["scene.blend", "scene_v2.blend"]);
    assert_eq!(versions(dir.path()), vec![2]);
}
