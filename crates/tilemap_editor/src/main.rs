mod editor;

fn main() {
    editor::run();
}
