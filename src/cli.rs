//! Command layer: each invocation loads the two persisted queues, runs one
//! command against them and writes both back, but only if the command
//! succeeded. A failing command leaves the files exactly as they were.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;

use crate::ring::RingQueue;
use crate::store;

/// Capacity of the two CLI-managed queues.
pub const QUEUE_CAPACITY: usize = 10;

const QUEUE_FILES: [&str; 2] = [".queue1", ".queue2"];

#[derive(Parser)]
#[command(name = "ringq")]
#[command(about = "Queues manager")]
#[command(after_help = after_help())]
struct Cli {
    /// Hexadecimal command id, 0x00 through 0x06
    command: String,
    /// Command arguments
    args: Vec<String>,
}

fn after_help() -> String {
    format!(
        "\
The available commands are:
    0x00 <queue> <element>  Add an <element> to a <queue>
    0x01 <queue> <element>  Remove an <element> from a <queue>
    0x02 <queue>            Print size and contents of a <queue>
    0x03 <queue>            Print contents of a <queue>
    0x04                    Merge the queues in a zipper pattern, see below
    0x05 <queue> <bit>      Print elements of a <queue> which have bit
                            number <bit> set to 1
    0x06 <queue>            Dequeue a <queue>

Where
  * <queue>   is a queue number, either 1 or 2.
  * <element> is a 32-bit unsigned integer, decimal or 0x-prefixed hex.
  * <bit>     is a bit number, 0 through 31.

Merging queues:
The queues are interleaved like a zipper slider brings the two sides
together: `1, 2, 3` and `4, 5, 6` merge into `1, 4, 2, 5, 3, 6`. The
second queue is emptied and the first one receives the result.

The queues have a maximum length of {QUEUE_CAPACITY} and operate in {mode}
mode. They are loaded from the files `.queue1` and `.queue2` in the
working directory and saved back on success.",
        mode = mode_name(),
    )
}

const fn mode_name() -> &'static str {
    if cfg!(feature = "fifo") { "FIFO" } else { "LIFO" }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Push,
    RemoveValue,
    PrintSized,
    Print,
    Merge,
    FindBit,
    Dequeue,
}

impl Command {
    fn from_arg(arg: &str) -> Result<Self> {
        let digits = arg
            .strip_prefix("0x")
            .or_else(|| arg.strip_prefix("0X"))
            .unwrap_or(arg);
        let id = u32::from_str_radix(digits, 16)
            .with_context(|| format!("can't parse command id {arg:?} as hex"))?;
        Ok(match id {
            0x00 => Self::Push,
            0x01 => Self::RemoveValue,
            0x02 => Self::PrintSized,
            0x03 => Self::Print,
            0x04 => Self::Merge,
            0x05 => Self::FindBit,
            0x06 => Self::Dequeue,
            _ => bail!("unknown command id {arg:?}, expected 0x00 through 0x06"),
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(&cli.command, &cli.args, Path::new("."))
}

fn execute(command: &str, args: &[String], dir: &Path) -> Result<()> {
    let command = Command::from_arg(command)?;
    let paths = QUEUE_FILES.map(|name| dir.join(name));
    let mut queues: [RingQueue<QUEUE_CAPACITY>; 2] = [
        store::load_path(&paths[0]).with_context(|| format!("loading {}", QUEUE_FILES[0]))?,
        store::load_path(&paths[1]).with_context(|| format!("loading {}", QUEUE_FILES[1]))?,
    ];
    debug!(?command, q1 = queues[0].len(), q2 = queues[1].len(), "dispatching");

    match command {
        Command::Push => {
            let [queue, element] = args else {
                bail!("command 0x00 expects 2 args: <queue> <element>");
            };
            let n = queue_index(queue)?;
            let value = parse_value(element)?;
            queues[n]
                .push_back(value)
                .with_context(|| format!("can't add {value} to queue {}", n + 1))?;
        }
        Command::RemoveValue => {
            let [queue, element] = args else {
                bail!("command 0x01 expects 2 args: <queue> <element>");
            };
            let n = queue_index(queue)?;
            let value = parse_value(element)?;
            let offset = queues[n]
                .find(value)
                .with_context(|| format!("can't find {value} in queue {}", n + 1))?;
            queues[n].remove(offset);
        }
        Command::PrintSized => {
            let [queue] = args else {
                bail!("command 0x02 expects 1 arg: <queue>");
            };
            let queue = &queues[queue_index(queue)?];
            println!("Queue size: {}", queue.len());
            println!(
                "Contents:{}",
                queue.iter().map(|v| format!(" {v}")).collect::<String>()
            );
        }
        Command::Print => {
            let [queue] = args else {
                bail!("command 0x03 expects 1 arg: <queue>");
            };
            let queue = &queues[queue_index(queue)?];
            println!("{}", join(queue.iter()));
        }
        Command::Merge => {
            let (first, second) = queues.split_at_mut(1);
            first[0]
                .merge_into(&mut second[0])
                .context("can't merge queues: their combined size exceeds the capacity")?;
        }
        Command::FindBit => {
            let [queue, bit] = args else {
                bail!("command 0x05 expects 2 args: <queue> <bit>");
            };
            let queue = &queues[queue_index(queue)?];
            let bit: u32 = bit
                .parse()
                .ok()
                .filter(|b| *b < u32::BITS)
                .with_context(|| format!("bit number {bit:?} should be 0 through 31"))?;
            let mask = 1u32 << bit;
            println!("{}", join(queue.iter().filter(|v| v & mask != 0)));
        }
        Command::Dequeue => {
            let [queue] = args else {
                bail!("command 0x06 expects 1 arg: <queue>");
            };
            let n = queue_index(queue)?;
            let value = dequeue(&mut queues[n])
                .with_context(|| format!("can't dequeue queue {}", n + 1))?;
            println!("{value}");
        }
    }

    store::save_path(&queues[0], &paths[0]).with_context(|| format!("saving {}", QUEUE_FILES[0]))?;
    store::save_path(&queues[1], &paths[1]).with_context(|| format!("saving {}", QUEUE_FILES[1]))?;
    Ok(())
}

/// Which end `0x06` takes from is a build-time choice; the default (LIFO)
/// removes the oldest surviving element.
fn dequeue<const N: usize>(queue: &mut RingQueue<N>) -> Result<u32, crate::ring::QueueError> {
    if cfg!(feature = "fifo") {
        queue.pop_back()
    } else {
        queue.pop_front()
    }
}

fn queue_index(arg: &str) -> Result<usize> {
    match parse_value(arg) {
        Ok(1) => Ok(0),
        Ok(2) => Ok(1),
        _ => bail!("queue number should be either 1 or 2, got {arg:?}"),
    }
}

fn parse_value(arg: &str) -> Result<u32> {
    if let Some(digits) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        u32::from_str_radix(digits, 16)
    } else {
        arg.parse()
    }
    .with_context(|| format!("can't parse {arg:?} as a 32-bit unsigned value"))
}

fn join(values: impl Iterator<Item = u32>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn write_queue(dir: &Path, name: &str, values: &[u32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        std::fs::write(dir.join(name), bytes).unwrap();
    }

    fn read_queue(dir: &Path, name: &str) -> Vec<u32> {
        std::fs::read(dir.join(name))
            .unwrap()
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes(c.try_into().unwrap()))
            .collect()
    }

    #[test]
    fn command_ids_parse_as_hex() {
        assert_eq!(Command::from_arg("0").unwrap(), Command::Push);
        assert_eq!(Command::from_arg("0x04").unwrap(), Command::Merge);
        assert_eq!(Command::from_arg("06").unwrap(), Command::Dequeue);
        assert!(Command::from_arg("7").is_err());
        assert!(Command::from_arg("zz").is_err());
    }

    #[test]
    fn values_parse_with_radix_prefix() {
        assert_eq!(parse_value("42").unwrap(), 42);
        assert_eq!(parse_value("0xff").unwrap(), 255);
        assert!(parse_value("-1").is_err());
        assert!(parse_value("4294967296").is_err());
    }

    #[test]
    fn push_persists_both_queues() {
        let dir = tempfile::tempdir().unwrap();
        execute("0", &args(&["1", "42"]), dir.path()).unwrap();
        execute("0", &args(&["1", "43"]), dir.path()).unwrap();
        // push_back installs at offset 0, so the later value comes first.
        assert_eq!(read_queue(dir.path(), ".queue1"), [43, 42]);
        assert_eq!(read_queue(dir.path(), ".queue2"), []);
    }

    #[test]
    fn remove_takes_first_match() {
        let dir = tempfile::tempdir().unwrap();
        write_queue(dir.path(), ".queue2", &[1, 2, 3, 2]);
        execute("1", &args(&["2", "2"]), dir.path()).unwrap();
        assert_eq!(read_queue(dir.path(), ".queue2"), [1, 3, 2]);
    }

    #[test]
    fn merge_command() {
        let dir = tempfile::tempdir().unwrap();
        write_queue(dir.path(), ".queue1", &[1, 3, 5]);
        write_queue(dir.path(), ".queue2", &[2, 4]);
        execute("4", &args(&[]), dir.path()).unwrap();
        assert_eq!(read_queue(dir.path(), ".queue1"), [1, 2, 3, 4, 5]);
        assert_eq!(read_queue(dir.path(), ".queue2"), []);
    }

    #[test]
    fn failed_command_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let full: Vec<u32> = (0..QUEUE_CAPACITY as u32).collect();
        write_queue(dir.path(), ".queue1", &full);
        write_queue(dir.path(), ".queue2", &[9]);
        assert!(execute("0", &args(&["1", "5"]), dir.path()).is_err());
        assert_eq!(read_queue(dir.path(), ".queue1"), full);
        assert_eq!(read_queue(dir.path(), ".queue2"), [9]);
    }

    #[test]
    fn bad_queue_number_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(execute("0", &args(&["3", "5"]), dir.path()).is_err());
        assert!(execute("0", &args(&["one", "5"]), dir.path()).is_err());
    }

    #[test]
    fn queue_number_accepts_radix_prefix() {
        // Queue numbers follow the same base-0 convention as elements.
        assert_eq!(queue_index("0x1").unwrap(), 0);
        assert_eq!(queue_index("0x2").unwrap(), 1);
        let dir = tempfile::tempdir().unwrap();
        execute("0", &args(&["0x2", "5"]), dir.path()).unwrap();
        assert_eq!(read_queue(dir.path(), ".queue2"), [5]);
    }

    #[cfg(not(feature = "fifo"))]
    #[test]
    fn dequeue_takes_the_oldest_element() {
        let dir = tempfile::tempdir().unwrap();
        write_queue(dir.path(), ".queue1", &[5, 6, 7]);
        execute("6", &args(&["1"]), dir.path()).unwrap();
        assert_eq!(read_queue(dir.path(), ".queue1"), [5, 6]);
    }
}
