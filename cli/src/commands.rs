use epicurean_core::satiety::{self, SatietyState};
use epicurean_core::{EnchantmentManager, ModState, Player};
use epicurean_types::formatting::{format_decimal, format_seconds};

use crate::simulator::Simulator;

/// Send a chat command as the simulated player.
pub fn chat(sim: &mut Simulator, line: &str) {
    let player = sim.player_name().to_string();
    if let Err(e) = sim.host.run_command(&player, line) {
        println!("{e}");
    }
    print_messages(sim);
}

pub fn tick(sim: &mut Simulator, count: u32) {
    sim.tick(count);
    print_messages(sim);
    println!("Ticked {count} time(s), clock {}", sim.clock().format("%H:%M:%S"));
}

pub fn show_status(sim: &Simulator) {
    let settings = sim.epicurean.settings();
    let european = settings.european_numbers;

    println!("Mod: {}", sim.epicurean.state());
    println!("Settings: {}", sim.epicurean.store().path().display());
    if let Some(spell) = sim.epicurean.custom_spell() {
        println!(
            "Spell: {} (ID={} Cat={} Power={} Mod={})",
            spell.name(),
            spell.id(),
            spell.category(),
            spell.power(),
            format_decimal(f64::from(spell.stat_mod_val()), 0, european)
        );
    }

    let Some(player) = sim.player() else {
        println!("No player");
        return;
    };
    let state = match SatietyState::of(player) {
        SatietyState::Fed => "fed",
        SatietyState::Hungry => "hungry",
    };
    println!(
        "{} [{}]: {} with {} / {} seconds of fullness, {} enchantment(s)",
        player.name(),
        player.access_level(),
        state,
        format_seconds(satiety::satiety(player), european),
        format_seconds(settings.max_satiety, european),
        player.active_enchantments().len()
    );
}

pub fn reload(sim: &mut Simulator) {
    match sim.reload() {
        ModState::Running => println!("Reloaded"),
        state => println!("Reload failed, mod is {state}"),
    }
}

pub fn exit(sim: &mut Simulator) {
    sim.shutdown();
    println!("Exiting...");
}

fn print_messages(sim: &mut Simulator) {
    for message in sim.drain_messages() {
        println!("> {message}");
    }
}
