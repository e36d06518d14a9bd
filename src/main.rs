fn main() {
    voxgrid::run();
}
