use bevy::prelude::*;

mod plugins;
mod universe;

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.05, 0.07, 0.1)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Starlane".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            plugins::core::CorePlugin,
            plugins::api::ApiPlugin,
            plugins::map::MapPlugin,
            plugins::nav::NavPlugin,
            plugins::ui::UIPlugin,
        ))
        .run();
}
