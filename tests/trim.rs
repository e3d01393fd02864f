//! End-to-end trims over complete PNM streams: build an image, run the
//! whole driver, inspect the output stream.

use std::io::{Cursor, Seek, SeekFrom, Write};

use pnmtrim::config::{BackgroundChoice, BlankPolicy, OutputMode, TrimConfig};
use pnmtrim::driver::{self, TrimError};
use pnmtrim::pnm::{Header, Pixel, PixelFormat, PnmReader, PnmWriter};

fn write_image(out: &mut Vec<u8>, format: PixelFormat, maxval: u16, rows: &[Vec<Pixel>]) {
    let hdr = Header {
        cols: rows[0].len() as u32,
        rows: rows.len() as u32,
        maxval,
        format,
        raw: true,
    };
    let mut w = PnmWriter::new(&mut *out);
    w.write_header(&hdr).unwrap();
    for row in rows {
        w.write_row(&hdr, row).unwrap();
    }
}

fn run(cfg: &TrimConfig, stream: Vec<u8>) -> Result<Vec<u8>, TrimError> {
    let mut rdr = PnmReader::new(Cursor::new(stream));
    let mut out = Vec::new();
    driver::run::<_, Cursor<Vec<u8>>, _>(cfg, &mut rdr, None, &mut out)?;
    Ok(out)
}

fn decode(stream: Vec<u8>) -> (Header, Vec<Vec<Pixel>>) {
    let mut rdr = PnmReader::new(Cursor::new(stream));
    let hdr = rdr.read_header().unwrap();
    let mut rows = Vec::new();
    for _ in 0..hdr.rows {
        let mut row = vec![Pixel::default(); hdr.cols as usize];
        rdr.read_row(&hdr, &mut row).unwrap();
        rows.push(row);
    }
    (hdr, rows)
}

/// 10x10 white gray image with a 2x2 black square at rows/cols [4, 6).
fn white_with_black_square() -> Vec<u8> {
    let mut rows = vec![vec![Pixel::gray(255); 10]; 10];
    for r in 4..6 {
        for c in 4..6 {
            rows[r][c] = Pixel::gray(0);
        }
    }
    let mut stream = Vec::new();
    write_image(&mut stream, PixelFormat::Gray, 255, &rows);
    stream
}

#[test]
fn trims_white_border_down_to_the_black_square() {
    let out = run(&TrimConfig::default(), white_with_black_square()).unwrap();
    let (hdr, rows) = decode(out);
    assert_eq!((hdr.cols, hdr.rows), (2, 2));
    for row in rows {
        assert_eq!(row, vec![Pixel::gray(0); 2]);
    }
}

#[test]
fn report_matches_what_materializing_produces() {
    let report_cfg = TrimConfig {
        output: OutputMode::ReportSize,
        ..TrimConfig::default()
    };
    let report = run(&report_cfg, white_with_black_square()).unwrap();
    let report = String::from_utf8(report).unwrap();
    assert_eq!(report, "-4 -4 -4 -4 2 2\n");

    let out = run(&TrimConfig::default(), white_with_black_square()).unwrap();
    let (hdr, _) = decode(out);
    let dims: Vec<u32> = report
        .split_whitespace()
        .skip(4)
        .map(|t| t.parse().unwrap())
        .collect();
    assert_eq!(dims, [hdr.cols, hdr.rows]);
}

#[test]
fn trimming_a_trimmed_image_changes_nothing() {
    // Content with four distinct shades, so the trimmed result is not a
    // uniform raster the two-corner heuristic would call all-background
    let mut rows = vec![vec![Pixel::gray(255); 10]; 10];
    rows[4][4] = Pixel::gray(10);
    rows[4][5] = Pixel::gray(20);
    rows[5][4] = Pixel::gray(30);
    rows[5][5] = Pixel::gray(40);
    let mut stream = Vec::new();
    write_image(&mut stream, PixelFormat::Gray, 255, &rows);

    let once = run(&TrimConfig::default(), stream).unwrap();
    let (hdr, _) = decode(once.clone());
    assert_eq!((hdr.cols, hdr.rows), (2, 2));
    let twice = run(&TrimConfig::default(), once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn margin_survives_retrimming_with_same_margin() {
    let cfg = TrimConfig {
        margin: 2,
        ..TrimConfig::default()
    };
    let once = run(&cfg, white_with_black_square()).unwrap();
    let (hdr, _) = decode(once.clone());
    assert_eq!((hdr.cols, hdr.rows), (6, 6));
    let twice = run(&cfg, once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn blank_image_aborts_by_default_and_passes_on_request() {
    let mut blank = Vec::new();
    write_image(
        &mut blank,
        PixelFormat::Gray,
        255,
        &vec![vec![Pixel::gray(77); 4]; 3],
    );

    assert!(matches!(
        run(&TrimConfig::default(), blank.clone()),
        Err(TrimError::BlankImage)
    ));

    let pass_cfg = TrimConfig {
        blank_policy: BlankPolicy::Pass,
        ..TrimConfig::default()
    };
    let out = run(&pass_cfg, blank.clone()).unwrap();
    assert_eq!(out, blank);
}

#[test]
fn multi_image_stream_trims_each_independently() {
    let mut stream = Vec::new();
    // First: 4x4, bg 9, single dark pixel at (1,1)
    let mut rows = vec![vec![Pixel::gray(9); 4]; 4];
    rows[1][1] = Pixel::gray(0);
    write_image(&mut stream, PixelFormat::Gray, 255, &rows);
    // Second: 3x3, bg 200, content column down the middle
    let mut rows = vec![vec![Pixel::gray(200); 3]; 3];
    for r in 0..3 {
        rows[r][1] = Pixel::gray(50);
    }
    write_image(&mut stream, PixelFormat::Gray, 255, &rows);

    let out = run(&TrimConfig::default(), stream).unwrap();
    let mut rdr = PnmReader::new(Cursor::new(out));

    let first = rdr.read_header().unwrap();
    assert_eq!((first.cols, first.rows), (1, 1));
    let mut row = vec![Pixel::default(); 1];
    rdr.read_row(&first, &mut row).unwrap();
    assert_eq!(row[0], Pixel::gray(0));

    assert!(rdr.next_image().unwrap());
    let second = rdr.read_header().unwrap();
    assert_eq!((second.cols, second.rows), (1, 3));
    for _ in 0..3 {
        rdr.read_row(&second, &mut row).unwrap();
        assert_eq!(row[0], Pixel::gray(50));
    }
    assert!(!rdr.next_image().unwrap());
}

#[test]
fn rgb_image_with_named_background_and_closeness() {
    // Orange border with slight speckle, blue content block
    let orange = Pixel::new(255, 128, 0);
    let speckled = Pixel::new(250, 130, 4);
    let blue = Pixel::new(0, 0, 200);
    let mut rows = vec![vec![orange; 8]; 8];
    rows[1][2] = speckled;
    for r in 3..6 {
        for c in 3..6 {
            rows[r][c] = blue;
        }
    }
    let mut stream = Vec::new();
    write_image(&mut stream, PixelFormat::Rgb, 255, &rows);

    let cfg = TrimConfig {
        background: BackgroundChoice::Color("rgb:ff/80/00".into()),
        closeness: 3.0,
        ..TrimConfig::default()
    };
    let out = run(&cfg, stream).unwrap();
    let (hdr, rows) = decode(out);
    assert_eq!(hdr.format, PixelFormat::Rgb);
    assert_eq!((hdr.cols, hdr.rows), (3, 3));
    for row in rows {
        assert_eq!(row, vec![blue; 3]);
    }
}

#[test]
fn bilevel_image_round_trips_through_packed_rows() {
    // 16x6 white PBM with a black bar at rows 2-3, cols 5-10
    let white = Pixel::gray(1);
    let black = Pixel::gray(0);
    let mut rows = vec![vec![white; 16]; 6];
    for r in 2..4 {
        for c in 5..11 {
            rows[r][c] = black;
        }
    }
    let mut stream = Vec::new();
    write_image(&mut stream, PixelFormat::Bilevel, 1, &rows);

    let out = run(&TrimConfig::default(), stream).unwrap();
    let (hdr, rows) = decode(out);
    assert_eq!(hdr.format, PixelFormat::Bilevel);
    assert_eq!((hdr.cols, hdr.rows), (6, 2));
    for row in rows {
        assert_eq!(row, vec![black; 6]);
    }
}

#[test]
fn plain_format_input_materializes_as_raw() {
    let plain = b"P2\n# a comment\n5 3\n255\n\
                  9 9 9 9 9\n9 9 4 9 9\n9 9 9 9 9\n"
        .to_vec();
    let out = run(&TrimConfig::default(), plain).unwrap();
    let (hdr, rows) = decode(out);
    assert!(hdr.raw);
    assert_eq!((hdr.cols, hdr.rows), (1, 1));
    assert_eq!(rows[0][0], Pixel::gray(4));
}

#[test]
fn border_stream_count_mismatch_names_the_short_stream() {
    let mut input = Vec::new();
    let mut rows = vec![vec![Pixel::gray(9); 3]; 3];
    rows[1][1] = Pixel::gray(0);
    write_image(&mut input, PixelFormat::Gray, 255, &rows);
    write_image(&mut input, PixelFormat::Gray, 255, &rows);
    let mut border = Vec::new();
    write_image(&mut border, PixelFormat::Gray, 255, &rows);

    let mut input_rdr = PnmReader::new(Cursor::new(input));
    let mut border_rdr = PnmReader::new(Cursor::new(border));
    let mut out = Vec::new();
    let err = driver::run(
        &TrimConfig::default(),
        &mut input_rdr,
        Some(&mut border_rdr),
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TrimError::StreamCountMismatch {
            exhausted: "border file",
            ..
        }
    ));
}

#[test]
fn reads_from_a_real_file() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&white_with_black_square()).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut rdr = PnmReader::new(file);
    let mut out = Vec::new();
    driver::run::<_, Cursor<Vec<u8>>, _>(&TrimConfig::default(), &mut rdr, None, &mut out)
        .unwrap();
    let (hdr, _) = decode(out);
    assert_eq!((hdr.cols, hdr.rows), (2, 2));
}
