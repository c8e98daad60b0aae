use std::num::NonZero;

use anyhow::{bail, Context, Result};
use clap::Parser;
use solidus::{SlantBoardBuilder, SolveOptions, SolveStatus};

#[derive(Parser)]
#[command(name = "solver")]
#[command(about = "Solve Slant puzzles from a game id")]
struct Cmd {
    /// Game id in `WxH:description` form, e.g. `5x5:d1b2a0c1b3c2a1b`
    game: String,

    /// Enable the speculative connect trial between adjacent clues that
    /// each need exactly one more connection
    #[arg(long)]
    chain_trials: bool,

    /// Print only the moves and the final status
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cmd = Cmd::parse();

    let (params, desc) = cmd
        .game
        .split_once(':')
        .context("game id must look like WxH:description")?;
    let (width, height) = params
        .split_once('x')
        .context("params must look like WxH")?;
    let width: NonZero<usize> = width.parse().context("bad width")?;
    let height: NonZero<usize> = height.parse().context("bad height")?;

    let mut board = match SlantBoardBuilder::from_desc((width, height), desc).build() {
        Ok(board) => board,
        Err(reasons) => bail!("invalid puzzle: {reasons:?}"),
    };

    if !cmd.quiet {
        println!("{board}");
    }

    let status = board.solve_with(SolveOptions {
        chain_trials: cmd.chain_trials,
        ..Default::default()
    });

    if !cmd.quiet {
        println!("{board}");
    }
    for m in board.move_strings() {
        println!("{m}");
    }
    match status {
        SolveStatus::Solved => println!("Success!"),
        SolveStatus::Stalled => println!("Failure..."),
    }

    Ok(())
}
