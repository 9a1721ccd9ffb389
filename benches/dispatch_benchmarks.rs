//! Benchmarks for script-to-native dispatch.
//!
//! Measures the cost of each hook a script hits:
//! - construction through `<Type>.new()`
//! - property reads and writes (native and side-table)
//! - method calls with dot and colon syntax
//! - free function calls
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --bench dispatch_benchmarks --features profile-with-puffin
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use mlua::{Function, Lua};
use reflua::{Binder, Reflect, TypeRegistry};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[derive(Clone, Default)]
struct Vec2 {
    x: i32,
    y: i32,
}

impl Reflect for Vec2 {
    fn type_name() -> &'static str {
        "Vec"
    }
}

fn bound_lua() -> Lua {
    let mut registry = TypeRegistry::with_primitives();
    registry
        .register_class::<Vec2>()
        .constructor()
        .property("x", |v: &Vec2| v.x, |v: &mut Vec2, x| v.x = x)
        .and_then(|b| b.property("y", |v: &Vec2| v.y, |v: &mut Vec2, y| v.y = y))
        .and_then(|b| b.method("length", |v: &Vec2| v.x + v.y))
        .and_then(|b| {
            b.method("add", |v: &Vec2, o: Vec2| Vec2 {
                x: v.x + o.x,
                y: v.y + o.y,
            })
        })
        .and_then(|b| b.build())
        .unwrap();
    registry.register_function("twice", |x: i32| x * 2).unwrap();

    let lua = Lua::new();
    Binder::new(registry).bind(&lua).unwrap();
    lua
}

/// Compile `body` once as a function taking a prepared instance `v`.
fn prepared(lua: &Lua, body: &str) -> Function {
    lua.load(format!("return function(v) {body} end"))
        .eval()
        .unwrap()
}

fn instance_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let lua = bound_lua();
    let v: mlua::AnyUserData = lua
        .load("local v = Vec.new(); v.x = 3; v.y = 4; return v")
        .eval()
        .unwrap();

    let mut group = c.benchmark_group("dispatch/instance");

    let construct = prepared(&lua, "return Vec.new()");
    group.bench_function("construct", |b| {
        b.iter(|| {
            let _: mlua::Value = construct.call(black_box(&v)).unwrap();
        });
    });

    let read = prepared(&lua, "return v.x");
    group.bench_function("property_read", |b| {
        b.iter(|| black_box(read.call::<i32>(&v).unwrap()));
    });

    let write = prepared(&lua, "v.y = 9");
    group.bench_function("property_write", |b| {
        b.iter(|| write.call::<()>(black_box(&v)).unwrap());
    });

    let side = prepared(&lua, "v.tag = 1; return v.tag");
    group.bench_function("side_table", |b| {
        b.iter(|| black_box(side.call::<i32>(&v).unwrap()));
    });

    group.finish();
}

fn call_benchmarks(c: &mut Criterion) {
    let lua = bound_lua();
    let v: mlua::AnyUserData = lua
        .load("local v = Vec.new(); v.x = 3; v.y = 4; return v")
        .eval()
        .unwrap();

    let mut group = c.benchmark_group("dispatch/calls");

    let dot = prepared(&lua, "return v.length()");
    group.bench_function("method_dot", |b| {
        b.iter(|| black_box(dot.call::<i32>(&v).unwrap()));
    });

    let colon = prepared(&lua, "return v:length()");
    group.bench_function("method_colon", |b| {
        b.iter(|| black_box(colon.call::<i32>(&v).unwrap()));
    });

    let by_value = prepared(&lua, "return v:add(v)");
    group.bench_function("method_class_argument", |b| {
        b.iter(|| {
            let _: mlua::Value = by_value.call(black_box(&v)).unwrap();
            end_profiling_frame();
        });
    });

    let global = prepared(&lua, "return twice(21)");
    group.bench_function("global_function", |b| {
        b.iter(|| black_box(global.call::<i32>(&v).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, instance_benchmarks, call_benchmarks);
criterion_main!(benches);
