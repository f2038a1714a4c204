//! Drives the probe and the extractor against a scripted stand-in for ffmpeg.
#![cfg(unix)]

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use mediatap::config::MediaConfig;
use mediatap::frame_types::{classify, keyframes};
use mediatap::media::{
    AudioExtractor, AudioOutcome, FrameTypeProbe, MediaCommandBuilder, MediaProcessorFactory,
    AUDIO_FILE_NAME,
};

const ETXTBSY: i32 = 26;

/// Copies the `-i` input to the last argument, like `-c:a copy` would
const COPY_INPUT_TO_OUTPUT: &str = r#"
prev=""
for a; do
  if [ "$prev" = "-i" ]; then input="$a"; fi
  prev="$a"
done
for last; do :; done
cp "$input" "$last"
"#;

struct FakeTool {
    dir: TempDir,
    binary: PathBuf,
}

impl FakeTool {
    /// `body` runs with ffmpeg's arguments; every invocation is logged first
    fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("ffmpeg");
        let log = dir.path().join("calls.log");
        let script = format!(
            "#!/bin/sh\n[ \"$1\" = \"--ping\" ] && exit 0\necho \"$*\" >> '{}'\n{}\n",
            log.display(),
            body
        );
        std::fs::write(&binary, script).unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();
        wait_until_executable(&binary);
        Self { dir, binary }
    }

    fn builder(&self) -> MediaCommandBuilder {
        MediaCommandBuilder::new(self.binary.to_string_lossy())
    }

    fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// A freshly written script can briefly fail with ETXTBSY while another test
/// thread forks with the write handle still open.
fn wait_until_executable(binary: &Path) {
    for _ in 0..50 {
        match std::process::Command::new(binary).arg("--ping").status() {
            Ok(_) => return,
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => {
                std::thread::sleep(std::time::Duration::from_millis(20))
            }
            Err(e) => panic!("fake tool not executable: {}", e),
        }
    }
    panic!("fake tool stayed busy");
}

fn showinfo_line(n: u32, frame_type: &str, key: bool) -> String {
    format!(
        "[Parsed_showinfo_0 @ 0x55d0c8a3e2c0] n:{:>4} pts:{:>7} pts_time:{:<8} i:P iskey:{} type:{} checksum:00000000",
        n,
        n * 1001,
        f64::from(n) * 0.0417,
        if key { 1 } else { 0 },
        frame_type
    )
}

fn source(dir: &TempDir, content: &str) -> PathBuf {
    let file = dir.child("sample.mkv");
    file.write_str(content).unwrap();
    file.path().to_path_buf()
}

#[test]
fn probe_returns_every_line_in_emission_order() {
    let tool = FakeTool::new(
        r#"
i=0
while [ $i -lt 200 ]; do
  if [ $((i % 2)) -eq 0 ]; then echo "line $i"; else echo "line $i" >&2; fi
  i=$((i + 1))
done
"#,
    );
    let work = TempDir::new().unwrap();
    let input = source(&work, "video");

    let sequence = FrameTypeProbe::new(tool.builder()).probe(&input).unwrap();

    let expected: Vec<String> = (0..200).map(|i| format!("line {}", i)).collect();
    assert_eq!(sequence.lines, expected);
    assert!(sequence.success());
    assert_eq!(
        tool.calls(),
        vec![format!(
            "-hide_banner -i {} -vf showinfo -f null -loglevel debug -",
            input.display()
        )]
    );
}

#[test]
fn probe_without_output_is_empty() {
    let tool = FakeTool::new("exit 0");
    let work = TempDir::new().unwrap();
    let input = source(&work, "video");

    let sequence = FrameTypeProbe::new(tool.builder()).probe(&input).unwrap();
    assert!(sequence.is_empty());
    assert_eq!(sequence.exit_code, Some(0));
}

#[test]
fn probe_keeps_partial_output_on_failure() {
    let tool = FakeTool::new("echo 'frame one' >&2\necho 'Error while decoding stream #0:0' >&2\nexit 1");
    let work = TempDir::new().unwrap();
    let input = source(&work, "video");

    let sequence = FrameTypeProbe::new(tool.builder()).probe(&input).unwrap();
    assert_eq!(sequence.lines, vec!["frame one", "Error while decoding stream #0:0"]);
    assert_eq!(sequence.exit_code, Some(1));
    assert!(!sequence.success());
}

#[test]
fn probe_output_classifies_into_frames() {
    let lines = [
        "Input #0, matroska,webm, from 'sample.mkv':".to_string(),
        showinfo_line(0, "I", true),
        showinfo_line(1, "B", false),
        showinfo_line(2, "P", false),
        showinfo_line(3, "I", true),
    ];
    let body: String = lines
        .iter()
        .map(|l| format!("echo '{}' >&2\n", l))
        .collect();
    let tool = FakeTool::new(&body);
    let work = TempDir::new().unwrap();
    let input = source(&work, "video");

    let sequence = FrameTypeProbe::new(tool.builder()).probe(&input).unwrap();
    assert_eq!(sequence.len(), 5);

    let frames = classify(&sequence.lines);
    assert_eq!(frames.len(), 4);
    assert_eq!(keyframes(&frames), vec![0, 3]);
}

#[test]
fn extraction_skipped_without_audio_stream() {
    let tool = FakeTool::new(
        r#"
case "$*" in
  *"-t 0"*) echo "Output file #0 does not contain any stream" >&2; exit 1 ;;
esac
"#,
    );
    let work = TempDir::new().unwrap();
    let input = source(&work, "video only");
    let extractor = AudioExtractor::new(tool.builder());
    let params = vec!["-c:a".to_string(), "flac".to_string()];

    for _ in 0..2 {
        let outcome = extractor.extract(&input, work.path(), &params).unwrap();
        assert_eq!(outcome, AudioOutcome::NoAudioStream);
        assert!(!work.child(AUDIO_FILE_NAME).path().exists());
    }

    let calls = tool.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        format!(
            "-y -hide_banner -loglevel error -ss 0 -i {} -t 0 -vn -c:a copy -f null -",
            input.display()
        )
    );
}

#[test]
fn extraction_runs_and_overwrites_when_audio_present() {
    let tool = FakeTool::new(&format!(
        "case \"$*\" in\n  *\"-t 0\"*) exit 0 ;;\nesac\n{}",
        COPY_INPUT_TO_OUTPUT
    ));
    let work = TempDir::new().unwrap();
    let input = source(&work, "first pass");
    let extractor = AudioExtractor::new(tool.builder());
    let params = vec!["-c:a".to_string(), "copy".to_string()];

    let outcome = extractor.extract(&input, work.path(), &params).unwrap();
    let audio = work.child(AUDIO_FILE_NAME);
    assert_eq!(
        outcome,
        AudioOutcome::Extracted {
            path: audio.path().to_path_buf(),
            exit_code: Some(0),
        }
    );
    assert_eq!(std::fs::read_to_string(audio.path()).unwrap(), "first pass");

    std::fs::write(&input, "second pass").unwrap();
    extractor.extract(&input, work.path(), &params).unwrap();
    assert_eq!(std::fs::read_to_string(audio.path()).unwrap(), "second pass");

    let calls = tool.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(
        calls[1],
        format!(
            "-y -hide_banner -loglevel error -i {} -map_metadata -1 -dn -vn -c:a copy {}",
            input.display(),
            audio.path().display()
        )
    );
}

#[test]
fn extraction_failure_is_reported_not_raised() {
    let tool = FakeTool::new(
        r#"
case "$*" in
  *"-t 0"*) exit 0 ;;
esac
echo "Unknown encoder 'nonsense'" >&2
exit 2
"#,
    );
    let work = TempDir::new().unwrap();
    let input = source(&work, "video");

    let outcome = AudioExtractor::new(tool.builder())
        .extract(&input, work.path(), &["-c:a".to_string(), "nonsense".to_string()])
        .unwrap();

    assert_eq!(
        outcome,
        AudioOutcome::Extracted {
            path: work.path().join(AUDIO_FILE_NAME),
            exit_code: Some(2),
        }
    );
    assert!(!work.child(AUDIO_FILE_NAME).path().exists());
}

#[tokio::test]
async fn processor_runs_both_components() {
    let tool = FakeTool::new(&format!(
        "case \"$*\" in\n  *showinfo*) echo '{}' >&2; exit 0 ;;\n  *\"-t 0\"*) exit 0 ;;\nesac\n{}",
        showinfo_line(0, "I", true),
        COPY_INPUT_TO_OUTPUT
    ));
    let work = TempDir::new().unwrap();
    let input = source(&work, "audio bytes");

    let processor = MediaProcessorFactory::create_processor(MediaConfig {
        binary_path: tool.binary.to_string_lossy().to_string(),
        ..MediaConfig::default()
    });

    let sequence = processor.probe_frame_types(&input).await.unwrap();
    assert_eq!(sequence.len(), 1);

    let outcome = processor
        .extract_audio(&input, work.path(), &MediaConfig::default().audio_params)
        .await
        .unwrap();
    let path = outcome.audio_path().unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "audio bytes");
}
