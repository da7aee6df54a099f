mod trash;
