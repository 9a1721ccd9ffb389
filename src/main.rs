//! Smoke entry: binds two sample types and runs a short script against them.

use env_logger::Env;

use reflua::arena::ArenaConfig;
use reflua::{ArenaLua, Binder, Reflect, RegistrationError, TypeRegistry};

#[derive(Clone, Debug, Default, PartialEq)]
struct Vector2 {
    x: f32,
    y: f32,
}

impl Vector2 {
    fn add(&self, other: Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Reflect for Vector2 {
    fn type_name() -> &'static str {
        "Vec"
    }
}

#[derive(Clone, Debug, Default)]
struct Rigidbody {
    pos: Vector2,
    rot: Vector2,
}

impl Reflect for Rigidbody {
    fn type_name() -> &'static str {
        "Rigidbody"
    }
}

fn register(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry
        .register_class::<Vector2>()
        .constructor()
        .property("x", |v: &Vector2| v.x, |v: &mut Vector2, x| v.x = x)?
        .property("y", |v: &Vector2| v.y, |v: &mut Vector2, y| v.y = y)?
        .method("add", Vector2::add)?
        .method("length", Vector2::length)?
        .build()?;

    registry
        .register_class::<Rigidbody>()
        .constructor()
        .property("pos", |r: &Rigidbody| r.pos.clone(), |r: &mut Rigidbody, p| r.pos = p)?
        .property("rot", |r: &Rigidbody| r.rot.clone(), |r: &mut Rigidbody, p| r.rot = p)?
        .build()?;

    registry.register_function("distance", |a: Vector2, b: Vector2| {
        Vector2 {
            x: b.x - a.x,
            y: b.y - a.y,
        }
        .length()
    })?;
    Ok(())
}

const SCRIPT: &str = r#"
local v = Vec.new()
v.x = 3.0
v.y = 4.0
print("vec: [" .. v.x .. ", " .. v.y .. "] length " .. v:length())

local w = v:add(v)
print("doubled: [" .. w.x .. ", " .. w.y .. "]")

local body = Rigidbody.new()
body.pos = w
body.tag = "player"
print(body.tag .. " at [" .. body.pos.x .. ", " .. body.pos.y .. "]")

print("distance " .. Global.distance(v, w))
print("type of Vec is " .. type(Vec) .. ", instance is " .. type(v))
"#;

const ARENA_CAPACITY: usize = 256 * 1024;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut registry = TypeRegistry::with_primitives();
    register(&mut registry)?;

    let lua = ArenaLua::new(ArenaConfig::with_capacity(ARENA_CAPACITY))?;
    let report = Binder::new(registry).bind(&lua)?;
    log::info!(
        "bound {} classes and {} functions",
        report.classes.len(),
        report.functions.len()
    );

    lua.load(SCRIPT).set_name("demo").exec()?;
    lua.gc_collect()?;

    let stats = lua.arena_stats();
    log::info!(
        "arena: {} of {} bytes bumped, {} free-list hits, {} heap fallbacks",
        lua.arena_bytes_used(),
        ARENA_CAPACITY,
        stats.free_list_hits,
        stats.fallback_allocations
    );
    Ok(())
}
