mod error;
mod patrol;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::GridError;
use crate::patrol::GridSimulator;

fn day6(part: u8, input: &str) -> Result<String, GridError> {
    let mut board = GridSimulator::parse(input)?;
    info!(height = board.height(), width = board.width(), start = ?board.start(), "board loaded");
    if part == 1 {
        Ok(board.coverage()?.len().to_string())
    } else {
        Ok(board.count_loop_obstacles()?.to_string())
    }
}

fn usage() -> ! {
    println!("one or two arguments expected - optionally test number and 1/2 for part");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().collect::<Vec<_>>();
    let (part_arg, fname) = match &args[..] {
        [_, part_arg] => (part_arg, "day6.in".to_owned()),
        [_, test_arg, part_arg] => (part_arg, format!("day6test{}.in", test_arg)),
        _ => usage(),
    };
    let part = match part_arg.as_str() {"1" => 1, "2" => 2, _ => usage()};

    let input = std::fs::read_to_string(&fname).with_context(|| format!("failed to read {}", fname))?;
    let time = std::time::Instant::now();
    println!("{}", day6(part, &input)?);
    info!(seconds = time.elapsed().as_secs_f32(), "elapsed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
....#.....
.........#
..........
..#.......
.......#..
..........
.#..^.....
........#.
#.........
......#...
";

    #[test]
    fn sample_answers() {
        assert_eq!(day6(1, SAMPLE).unwrap(), "41");
        assert_eq!(day6(2, SAMPLE).unwrap(), "6");
    }

    #[test]
    fn bad_input_is_an_error() {
        assert_eq!(day6(1, "....\n.#..\n"), Err(GridError::NoGuard));
        assert_eq!(day6(2, ".^.\n.?."), Err(GridError::InvalidChar {row: 1, col: 1, found: '?'}));
    }
}
