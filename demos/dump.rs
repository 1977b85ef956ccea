use std::{env::args, str::FromStr};
use tlextract::{DirectoryFileSystem, DumpFlags, DumperBuilder, GameContext};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let mut args = args().skip(1);
    let game_data = args.next().unwrap_or_else(|| "GameData".to_owned());

    let datasets = args
        .map(|name| DumpFlags::from_str(&name).unwrap())
        .fold(DumpFlags::empty(), |flags, flag| flags | flag);

    let files = DirectoryFileSystem::open(&game_data).unwrap();

    let dumper = DumperBuilder::new()
        .with_datasets(if datasets.is_empty() {
            DumpFlags::default()
        } else {
            datasets
        })
        .build();

    let report = dumper.dump(&GameContext::new(&files)).unwrap();

    for (dataset, err) in report.failures() {
        eprintln!("{dataset} failed: {err}");
    }
}
