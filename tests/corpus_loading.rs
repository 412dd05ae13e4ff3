use std::fs;

use hifz::{Corpus, Engine, HifzError, SessionEvent};

const IKHLAS_ONLY: &str = r#"{
  "suras": [
    {
      "index": 112,
      "name": "Al-Ikhlas",
      "verses": [
        "قُلْ هُوَ اللَّهُ أَحَدٌ",
        "اللَّهُ الصَّمَدُ",
        "لَمْ يَلِدْ وَلَمْ يُولَدْ",
        "وَلَمْ يَكُن لَّهُ كُفُوًا أَحَدٌ"
      ]
    }
  ]
}"#;

#[test]
fn corpus_loads_from_disk_and_drives_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ikhlas.json");
    fs::write(&path, IKHLAS_ONLY).unwrap();

    let corpus = Corpus::load(&path).unwrap();
    assert_eq!(corpus.total_verses(), 4);

    let engine = Engine::new(corpus);
    let session = engine.initialize(112, 1, 2).unwrap();
    let (session, event) = engine.process_utterance(session, "قل هو الله احد الله الصمد");
    match event {
        Some(SessionEvent::Matched { result, .. }) => {
            assert_eq!((result.start_verse, result.end_verse), (1, 2));
        }
        other => panic!("expected match, got {other:?}"),
    }
    assert_eq!(session.current_position(), 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Corpus::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, HifzError::Io(_)));
}

#[test]
fn duplicate_suras_on_disk_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.json");
    fs::write(
        &path,
        r#"{"suras":[{"index":1,"verses":["a"]},{"index":1,"verses":["b"]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        Corpus::load(&path),
        Err(HifzError::InvalidCorpus(_))
    ));
}

#[test]
fn unknown_sura_fails_fast() {
    let engine = Engine::new(Corpus::from_json_str(IKHLAS_ONLY).unwrap());
    assert!(matches!(
        engine.initialize(1, 1, 3),
        Err(HifzError::SuraNotFound { sura: 1 })
    ));
}
