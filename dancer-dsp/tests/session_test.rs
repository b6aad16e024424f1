use std::path::PathBuf;
use std::time::{Duration, Instant};

use dancer_dsp::{AudioError, AudioSession, BIN_COUNT, FFT_SIZE};
use dancer_viz::SpectrumSource;

fn write_test_wav(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    // One second of a 441 Hz tone.
    for i in 0..44_100u32 {
        let t = i as f32 / 44_100.0;
        let s = (2.0 * std::f32::consts::PI * 441.0 * t).sin();
        writer.write_sample((s * 0.25 * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn file_source_primes_the_sampler() {
    let path = write_test_wav("dancer_dsp_session_test.wav");
    let mut session = AudioSession::new();
    let mut sampler = session.sampler();

    session.connect_file(&path).unwrap();
    assert!(session.is_connected());

    // 2048 samples at 44.1 kHz arrive within ~50 ms; allow plenty of slack.
    let deadline = Instant::now() + Duration::from_secs(5);
    let sample = loop {
        if let Some(sample) = sampler.frequency_sample() {
            break sample;
        }
        assert!(Instant::now() < deadline, "sampler never became ready");
        std::thread::sleep(Duration::from_millis(10));
    };
    assert_eq!(sample.len(), BIN_COUNT);
    assert_eq!(BIN_COUNT, FFT_SIZE / 2);
    assert!(sample.bins().iter().any(|&b| b > 0), "tone produced no energy");

    session.disconnect();
    session.disconnect();
    assert!(!session.is_connected());

    // The analyser holds its last data after disconnect.
    assert!(sampler.frequency_sample().is_some());

    let _ = std::fs::remove_file(path);
}

#[test]
fn connecting_a_missing_file_fails_cleanly() {
    let mut session = AudioSession::new();
    let err = session
        .connect_file(std::path::Path::new("/no/such/file.wav"))
        .unwrap_err();
    assert!(matches!(err, AudioError::File { .. }));
    assert!(!session.is_connected());
}

#[test]
fn reconnecting_replaces_the_previous_source() {
    let path = write_test_wav("dancer_dsp_reconnect_test.wav");
    let mut session = AudioSession::new();
    session.connect_file(&path).unwrap();
    // Second connect releases the first feed before starting the new one.
    session.connect_file(&path).unwrap();
    assert!(session.is_connected());
    drop(session);

    let _ = std::fs::remove_file(path);
}
