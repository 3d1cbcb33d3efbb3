use std::fs::File;

use assert_cmd::Command;

fn ffconvert() -> Command {
    let mut cmd = Command::cargo_bin("ffconvert").unwrap();
    cmd.env_remove("FFCONVERT_FFMPEG")
        .env_remove("FFCONVERT_FFPROBE")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().clone();
    String::from_utf8(output.stdout).unwrap()
}

fn stderr_of_failure(cmd: &mut Command) -> String {
    let output = cmd.assert().failure().code(1).get_output().clone();
    String::from_utf8(output.stderr).unwrap()
}

#[test]
fn help_works() {
    ffconvert().arg("--help").assert().success();
    ffconvert().args(["convert", "--help"]).assert().success();
}

#[test]
fn presets_lists_tables() {
    let stdout = stdout_of(ffconvert().arg("presets"));
    assert!(stdout.contains("lossless   crf 0"));
    assert!(stdout.contains("h264       libx264"));
    assert!(stdout.contains("2160p      scale=-2:2160"));
}

#[test]
fn missing_ffmpeg_is_reported_with_install_hint() {
    let stderr = stderr_of_failure(ffconvert().args([
        "--ffmpeg",
        "/nonexistent/ffmpeg-for-tests",
        "convert",
        "a.mov",
    ]));
    assert!(stderr.contains("not found in PATH"));
    assert!(stderr.contains("brew install ffmpeg"));
}

#[cfg(unix)]
mod with_shell_as_ffmpeg {
    use super::*;

    fn convert() -> Command {
        let mut cmd = ffconvert();
        cmd.args(["--ffmpeg", "/bin/sh", "convert"]);
        cmd
    }

    #[test]
    fn missing_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.mov");
        let stderr = stderr_of_failure(convert().arg(&input));
        assert!(stderr.contains("input file does not exist"));
    }

    #[test]
    fn unsupported_options_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mov");
        File::create(&input).unwrap();

        let cases = [
            (["-f", "flv"], "unsupported format: flv"),
            (["--codec", "av1"], "unsupported codec: av1"),
            (["-q", "ultra"], "unsupported quality: ultra"),
            (["-r", "big"], "invalid resolution: big"),
        ];
        for (flags, expected) in cases {
            let stderr = stderr_of_failure(convert().arg(&input).args(flags));
            assert!(stderr.contains(expected), "{stderr}");
        }
    }

    #[test]
    fn dry_run_prints_resolved_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mov");
        File::create(&input).unwrap();

        let stdout = stdout_of(convert().arg(&input).args(["-q", "low", "--dry-run"]));
        let expected_output = dir.path().join("a_converted.mp4");
        assert!(stdout.starts_with("/bin/sh -i "), "{stdout}");
        assert!(stdout.contains(" -c:v libx264 -crf 28 -c:a aac -b:a 128k "));
        assert!(stdout.trim_end().ends_with(expected_output.to_str().unwrap()));
        assert!(!expected_output.exists());
    }

    #[test]
    fn dry_run_for_webm_uses_vp9_constant_quality() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mov");
        File::create(&input).unwrap();
        let output = dir.path().join("clip.webm");

        let stdout = stdout_of(
            convert()
                .arg(&input)
                .arg("-o")
                .arg(&output)
                .args(["-r", "1280x720", "-p"]),
        );
        assert!(stdout.contains(" -c:v libvpx-vp9 -crf 23 -b:v 0 "));
        assert!(stdout.contains(" -vf scale=1280:720 ") || stdout.contains(" -vf 'scale=1280:720' "));
    }

    #[test]
    fn empty_option_values_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mov");
        File::create(&input).unwrap();

        let stdout = stdout_of(
            convert()
                .arg(&input)
                .args(["-o", "", "-f", "", "-q", "", "--dry-run"]),
        );
        let expected_output = dir.path().join("a_converted.mp4");
        assert!(stdout.contains(" -c:v libx264 -crf 23 "), "{stdout}");
        assert!(stdout.trim_end().ends_with(expected_output.to_str().unwrap()));
    }
}
